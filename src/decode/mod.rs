//! Payload decoders for the two kinds of resource container.

mod solid_list;
mod texture_pack;

pub use self::{
    solid_list::{decode_solid_list, SolidListDecoder},
    texture_pack::{decode_texture_pack, TexturePackDecoder},
};
