//! Decodes chunk-tree game resource archives.
//!
//! An archive is a flat sequence of chunks. Solid list containers hold 3D objects with their
//! meshes and materials; texture pack containers hold texture metadata plus one shared blob of
//! compressed pixel data. Everything else is skipped.

mod chunk;
mod cursor;
mod error;
mod rebuild;
mod solid;
mod texture;

pub mod decode;
pub mod export;

pub use self::{
    chunk::{walk, Chunk, ChunkVisitor, CONTAINER_BIT, SOLID_LIST, TEXTURE_PACK},
    cursor::{ByteCursor, PADDING_SENTINEL},
    error::Error,
    rebuild::MaterialSpan,
    solid::{Face, MeshMaterial, SolidList, SolidMesh, SolidObject, Vertex, VertexBuffer},
    texture::{Texture, TexturePack, TEXTURE_TYPE_ARGB8},
};

use {
    self::decode::{decode_solid_list, decode_texture_pack},
    log::{debug, trace},
    serde::{Deserialize, Serialize},
    std::{
        fs::File,
        io::{BufReader, Read, SeekFrom},
        path::Path,
    },
};

/// Chunk type tag constants of the container format.
pub mod tags {
    pub use crate::chunk::{
        MESH_DESCRIPTOR, MESH_INDEX_BUFFER, MESH_MATERIALS, MESH_MATERIAL_NAME,
        MESH_VERTEX_BUFFER, SOLID_LIST, SOLID_LIST_INFO, SOLID_OBJECT, SOLID_OBJECT_HEADER,
        SOLID_TEXTURE_HASHES, TEXTURE_COUNT, TEXTURE_DATA, TEXTURE_METADATA, TEXTURE_PACK,
        TEXTURE_PACK_INFO, TEXTURE_TYPES,
    };
}

/// A decoded top-level resource.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum Resource {
    SolidList(SolidList),
    TexturePack(TexturePack),
}

impl Resource {
    pub fn as_solid_list(&self) -> Option<&SolidList> {
        match self {
            Self::SolidList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_texture_pack(&self) -> Option<&TexturePack> {
        match self {
            Self::TexturePack(pack) => Some(pack),
            _ => None,
        }
    }
}

/// Walks the top-level chunks of an archive and decodes every solid list and texture pack.
///
/// Any error aborts the whole decode; no partial results are returned.
pub fn decode(data: &[u8]) -> Result<Vec<Resource>, Error> {
    let mut cursor = ByteCursor::new(data);
    let mut resources = vec![];

    while cursor.has_remaining() {
        let chunk = Chunk::read(&mut cursor)?;

        match chunk.ty {
            SOLID_LIST => resources.push(Resource::SolidList(decode_solid_list(&cursor, &chunk)?)),
            TEXTURE_PACK => {
                resources.push(Resource::TexturePack(decode_texture_pack(&cursor, &chunk)?))
            }
            ty => trace!("Skipping top-level chunk 0x{ty:08X} ({} bytes)", chunk.length),
        }

        cursor.seek(SeekFrom::Start(chunk.end_offset as u64))?;
    }

    debug!("Decoded {} resources from {} bytes", resources.len(), data.len());

    Ok(resources)
}

/// The decoded contents of one archive file.
#[derive(Debug, Default)]
pub struct Archive {
    resources: Vec<Resource>,
}

impl Archive {
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            resources: decode(data)?,
        })
    }

    /// Opens the given path and decodes an `Archive`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;

        Self::read(BufReader::new(file))
    }

    /// Reads the entire stream into memory and decodes it.
    pub fn read(mut reader: impl Read) -> Result<Self, Error> {
        let mut data = vec![];
        reader.read_to_end(&mut data)?;

        trace!("Read {} bytes", data.len());

        Self::from_bytes(&data)
    }

    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Finds the first solid object with the given name in any solid list.
    pub fn solid_object(&self, name: impl AsRef<str>) -> Option<&SolidObject> {
        let name = name.as_ref();

        self.solid_lists().find_map(|list| list.object(name))
    }

    pub fn solid_lists(&self) -> impl Iterator<Item = &SolidList> {
        self.resources.iter().filter_map(Resource::as_solid_list)
    }

    /// Finds a texture by hash in any texture pack, along with the pack holding its data.
    pub fn texture(&self, texture_hash: u32) -> Option<(&TexturePack, &Texture)> {
        self.texture_packs()
            .find_map(|pack| pack.texture(texture_hash).map(|texture| (pack, texture)))
    }

    pub fn texture_packs(&self) -> impl Iterator<Item = &TexturePack> {
        self.resources.iter().filter_map(Resource::as_texture_pack)
    }
}
