use {
    crate::{
        chunk::{
            walk, Chunk, ChunkVisitor, TEXTURE_COUNT, TEXTURE_DATA, TEXTURE_METADATA,
            TEXTURE_PACK_INFO, TEXTURE_TYPES,
        },
        cursor::{fixed_str, ByteCursor},
        texture::{Texture, TexturePack},
        Error,
    },
    bytemuck::{Pod, Zeroable},
    log::{debug, trace},
    std::{io::SeekFrom, mem::size_of},
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PackInfoRecord {
    _version: u32,
    name: [u8; 28],
    pipeline_path: [u8; 64],
    hash: u32,
}

/// Info chunks shorter than [`PackInfoRecord`] keep the hash in their last four bytes, which cuts
/// the pipeline path to 60 bytes.
#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ShortPackInfoRecord {
    _version: u32,
    name: [u8; 28],
    pipeline_path: [u8; 60],
    hash: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TextureInfoRecord {
    _blank: [u8; 12],
    texture_hash: u32,
    type_hash: u32,
    _unknown1: u32,
    data_size: u32,
    _unknown2: u32,
    width: u32,
    height: u32,
    mip_count: u32,
    _unknown3: [u32; 2],
    _unknown4: [u8; 24],
    _unknown5: u32,
    data_offset: u32,
    _unknown6: [u8; 60],
    name_length: u8,
}

const _: () = assert!(size_of::<PackInfoRecord>() == 100);
const _: () = assert!(size_of::<ShortPackInfoRecord>() == 96);
const _: () = assert!(size_of::<TextureInfoRecord>() == 145);

/// Bytes skipped on either side of the type tag of each texture type record.
const TYPE_RECORD_LEAD: i64 = 12;
const TYPE_RECORD_TAIL: i64 = 16;

/// Decodes the texture pack stored in the payload of a texture pack container.
pub fn decode_texture_pack(cursor: &ByteCursor<'_>, chunk: &Chunk) -> Result<TexturePack, Error> {
    let mut decoder = TexturePackDecoder::default();
    walk(cursor, chunk.offset, chunk.length, &mut decoder)?;

    decoder.finish()
}

/// Accumulates a [`TexturePack`] from the chunks of one texture pack container.
#[derive(Default)]
pub struct TexturePackDecoder {
    described: usize,
    pack: TexturePack,
    slots: Vec<Option<Texture>>,
}

impl TexturePackDecoder {
    /// Returns the decoded pack once every declared texture has been described.
    pub fn finish(self) -> Result<TexturePack, Error> {
        let declared = self.slots.len();
        let textures = self
            .slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::MissingTextures {
                declared,
                found: self.described,
            })?;

        debug!(
            "Decoded texture pack {} [{}]: {} textures, {} data bytes",
            self.pack.name,
            self.pack.pipeline_path,
            textures.len(),
            self.pack.data().len()
        );

        let mut pack = self.pack;
        pack.textures = textures;

        Ok(pack)
    }

    fn read_data(&mut self, chunk: &mut Chunk, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let data = cursor.read_bytes(chunk.length)?;
        self.pack.set_data(data.to_vec());

        trace!("Texture data: {} bytes", data.len());

        Ok(())
    }

    fn read_info(&mut self, chunk: &Chunk, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        if chunk.length >= size_of::<PackInfoRecord>() {
            let info: PackInfoRecord = cursor.read_pod()?;

            self.pack.name = fixed_str(&info.name);
            self.pack.pipeline_path = fixed_str(&info.pipeline_path);
            self.pack.hash = info.hash;
        } else {
            let info: ShortPackInfoRecord = cursor.read_pod()?;

            self.pack.name = fixed_str(&info.name);
            self.pack.pipeline_path = fixed_str(&info.pipeline_path);
            self.pack.hash = info.hash;
        }

        trace!(
            "Texture pack {} [{}] {:08X}",
            self.pack.name, self.pack.pipeline_path, self.pack.hash
        );

        Ok(())
    }

    fn read_metadata(&mut self, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        for _ in 0..self.slots.len() {
            let capacity = self.slots.len();
            let slot = self
                .slots
                .get_mut(self.described)
                .ok_or(Error::TextureOverflow { capacity })?;
            let info: TextureInfoRecord = cursor.read_pod()?;
            let name = fixed_str(cursor.read_bytes(info.name_length as usize)?);

            trace!(
                "Texture {name} {:08X}: {}x{}",
                { info.texture_hash },
                { info.width },
                { info.height }
            );

            *slot = Some(Texture {
                data_offset: info.data_offset,
                data_size: info.data_size,
                dds_type: 0,
                height: info.height,
                mip_count: info.mip_count,
                name,
                texture_hash: info.texture_hash,
                type_hash: info.type_hash,
                width: info.width,
            });

            self.described += 1;
        }

        Ok(())
    }

    fn read_types(&mut self, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        for slot in &mut self.slots {
            cursor.seek(SeekFrom::Current(TYPE_RECORD_LEAD))?;
            let dds_type = cursor.read_u32()?;
            cursor.seek(SeekFrom::Current(TYPE_RECORD_TAIL))?;

            if let Some(texture) = slot {
                texture.dds_type = dds_type;
            }
        }

        Ok(())
    }
}

impl ChunkVisitor for TexturePackDecoder {
    fn visit(&mut self, chunk: &mut Chunk, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        match chunk.ty {
            TEXTURE_PACK_INFO => self.read_info(chunk, cursor),
            TEXTURE_COUNT => {
                // One eight byte entry per texture
                self.slots.resize_with(chunk.length >> 3, || None);

                Ok(())
            }
            TEXTURE_METADATA => self.read_metadata(cursor),
            TEXTURE_TYPES => self.read_types(cursor),
            TEXTURE_DATA => self.read_data(chunk, cursor),
            _ => Ok(()),
        }
    }
}
