use {
    crate::{cursor::ByteCursor, Error},
    log::trace,
    std::io::SeekFrom,
};

/// Top bit of a chunk type: the payload is itself a sequence of chunks.
pub const CONTAINER_BIT: u32 = 0x8000_0000;

/// Size of the `{type, length}` pair in front of every payload.
pub const HEADER_LEN: usize = 8;

// Top-level containers
pub const SOLID_LIST: u32 = 0x8013_4000;
pub const TEXTURE_PACK: u32 = 0xB330_0000;

// Solid list payloads
pub const SOLID_LIST_INFO: u32 = 0x0013_4002;
pub const SOLID_OBJECT: u32 = 0x8013_4010;
pub const SOLID_OBJECT_HEADER: u32 = 0x0013_4011;
pub const SOLID_TEXTURE_HASHES: u32 = 0x0013_4012;
pub const MESH_DESCRIPTOR: u32 = 0x0013_4900;
pub const MESH_VERTEX_BUFFER: u32 = 0x0013_4B01;
pub const MESH_MATERIALS: u32 = 0x0013_4B02;
pub const MESH_INDEX_BUFFER: u32 = 0x0013_4B03;
pub const MESH_MATERIAL_NAME: u32 = 0x0013_4C02;

// Texture pack payloads
pub const TEXTURE_PACK_INFO: u32 = 0x3331_0001;
pub const TEXTURE_COUNT: u32 = 0x3331_0002;
pub const TEXTURE_METADATA: u32 = 0x3331_0004;
pub const TEXTURE_TYPES: u32 = 0x3331_0005;
pub const TEXTURE_DATA: u32 = 0x3332_0002;

/// One `{type, length, payload}` record of the container format.
///
/// `offset` is the absolute source offset of the payload, directly after the header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Chunk {
    pub end_offset: usize,
    pub full_length: usize,
    pub length: usize,
    pub offset: usize,
    pub ty: u32,
}

impl Chunk {
    pub fn new(ty: u32, length: usize, offset: usize) -> Self {
        Self {
            end_offset: offset + length,
            full_length: length + HEADER_LEN,
            length,
            offset,
            ty,
        }
    }

    /// Decodes the header at the cursor, leaving it on the first payload byte.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let ty = cursor.read_u32()?;
        let length = cursor.read_u32()? as usize;

        Ok(Self::new(ty, length, cursor.position()))
    }

    pub fn is_container(&self) -> bool {
        self.ty & CONTAINER_BIT == CONTAINER_BIT
    }

    /// Moves the start of the payload forward by `len` bytes; the end stays put.
    pub(crate) fn shrink_front(&mut self, len: usize) {
        let len = len.min(self.length);

        self.offset += len;
        self.length -= len;
        self.full_length -= len;
        self.end_offset = self.offset + self.length;
    }
}

/// Receives the chunks of a tree as [`walk`] descends through it.
pub trait ChunkVisitor {
    /// Called for every header, containers included, before the chunk is entered or decoded.
    fn enter(&mut self, _chunk: &Chunk) -> Result<(), Error> {
        Ok(())
    }

    /// Decodes a leaf payload. `cursor` is the enclosing window, positioned at `chunk.offset`.
    ///
    /// How much is read does not matter: the walk resumes at the chunk's end offset afterwards.
    fn visit(&mut self, chunk: &mut Chunk, cursor: &mut ByteCursor<'_>) -> Result<(), Error>;
}

/// Recursively visits every chunk stored in `offset..offset + len` of the cursor's source.
///
/// Containers are descended into, leaves are handed to the visitor, and after either the walk
/// always continues at the declared end of the chunk.
pub fn walk(
    cursor: &ByteCursor<'_>,
    offset: usize,
    len: usize,
    visitor: &mut impl ChunkVisitor,
) -> Result<(), Error> {
    let mut window = cursor.sub_window(offset, len)?;

    while window.has_remaining() {
        let mut chunk = Chunk::read(&mut window)?;

        trace!(
            "Chunk 0x{:08X}: {} bytes @ 0x{:X}",
            chunk.ty, chunk.length, chunk.offset
        );

        visitor.enter(&chunk)?;

        if chunk.is_container() {
            walk(&window, chunk.offset, chunk.length, visitor)?;
        } else {
            visitor.visit(&mut chunk, &mut window)?;
        }

        window.seek(SeekFrom::Start(chunk.end_offset as u64))?;
    }

    Ok(())
}
