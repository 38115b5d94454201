use {
    crate::texture::{Texture, TEXTURE_TYPE_ARGB8},
    bytemuck::{Pod, Zeroable},
    std::{
        io::{Error, Write},
        mem::size_of,
    },
};

pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

const PIXEL_FORMAT_FOUR_CC: u32 = 0x4;
const PIXEL_FORMAT_RGB_ALPHA: u32 = 0x41;
const CAPS_COMPRESSED: u32 = 0x0040_1008;
const CAPS_UNCOMPRESSED: u32 = 0x0040_100A;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct PixelFormat {
    size: u32,
    flags: u32,
    four_cc: u32,
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    a_mask: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Header {
    size: u32,
    _flags: u32,
    height: u32,
    width: u32,
    _pitch_or_linear_size: u32,
    _depth: u32,
    _mip_map_count: u32,
    _reserved1: [u32; 11],
    pixel_format: PixelFormat,
    caps: u32,
    _caps2: u32,
    _caps3: u32,
    _caps4: u32,
    _reserved2: u32,
}

const _: () = assert!(size_of::<PixelFormat>() == 32);
const _: () = assert!(size_of::<Header>() == 124);

impl Header {
    fn new(texture: &Texture) -> Self {
        let mut res = Self::zeroed();
        res.size = size_of::<Self>() as u32;
        res.width = texture.width;
        res.height = texture.height;
        res.pixel_format.size = size_of::<PixelFormat>() as u32;

        if texture.dds_type == TEXTURE_TYPE_ARGB8 {
            res.pixel_format.flags = PIXEL_FORMAT_RGB_ALPHA;
            res.pixel_format.rgb_bit_count = 32;
            res.pixel_format.r_mask = 0x00FF_0000;
            res.pixel_format.g_mask = 0x0000_FF00;
            res.pixel_format.b_mask = 0x0000_00FF;
            res.pixel_format.a_mask = 0xFF00_0000;
            res.caps = CAPS_UNCOMPRESSED;
        } else {
            res.pixel_format.flags = PIXEL_FORMAT_FOUR_CC;
            res.pixel_format.four_cc = texture.dds_type;
            res.caps = CAPS_COMPRESSED;
        }

        res
    }
}

/// Writes `texture` as a DDS file whose pixels are `data`, the texture's slice of the pack blob.
pub fn write_dds(texture: &Texture, data: &[u8], mut writer: impl Write) -> Result<(), Error> {
    writer.write_all(DDS_MAGIC)?;
    writer.write_all(bytemuck::bytes_of(&Header::new(texture)))?;
    writer.write_all(data)
}
