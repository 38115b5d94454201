use {
    log::warn,
    serde::{Deserialize, Serialize},
};

/// Texture type tag stored for uncompressed 32-bit A8R8G8B8 pixels; every other tag is a fourCC.
pub const TEXTURE_TYPE_ARGB8: u32 = 0x15;

/// Header metadata of one texture. The pixels live in the pack's shared data blob.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Texture {
    pub data_offset: u32,
    pub data_size: u32,

    /// Either [`TEXTURE_TYPE_ARGB8`] or a DDS fourCC code such as `DXT1`.
    pub dds_type: u32,

    pub height: u32,
    pub mip_count: u32,
    pub name: String,
    pub texture_hash: u32,
    pub type_hash: u32,
    pub width: u32,
}

impl Texture {
    /// Returns `true` when the pixels are block compressed.
    pub fn is_compressed(&self) -> bool {
        self.dds_type != TEXTURE_TYPE_ARGB8
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TexturePack {
    #[serde(with = "serde_bytes")]
    data: Vec<u8>,

    pub hash: u32,
    pub name: String,
    pub pipeline_path: String,
    pub textures: Vec<Texture>,
}

impl TexturePack {
    /// Raw blob shared by every texture of the pack.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Finds a texture by its hash, as referenced by solid object materials.
    pub fn texture(&self, texture_hash: u32) -> Option<&Texture> {
        self.textures
            .iter()
            .find(|texture| texture.texture_hash == texture_hash)
    }

    /// Borrows the pixels of `texture` from the shared blob.
    ///
    /// Returns `None` when the texture's data range does not fit inside the blob.
    pub fn texture_data(&self, texture: &Texture) -> Option<&[u8]> {
        let start = texture.data_offset as usize;
        let end = start + texture.data_size as usize;
        let res = self.data.get(start..end);

        if res.is_none() {
            warn!(
                "Texture {:08X} data {start}..{end} is outside the {} byte blob",
                texture.texture_hash,
                self.data.len()
            );
        }

        res
    }
}
