use thiserror::Error;

/// Everything that can stop a decode.
///
/// None of these are recoverable locally: once the cursor or the reconstructed mesh state is out
/// of step with the byte stream the whole archive is rejected.
#[derive(Debug, Error)]
pub enum Error {
    #[error("read of {requested} bytes at 0x{position:X} passes the window end 0x{end:X}")]
    OutOfBounds {
        position: usize,
        requested: usize,
        end: usize,
    },

    #[error("seek to {target} falls outside the window 0x{start:X}..0x{end:X}")]
    InvalidSeek { target: i64, start: usize, end: usize },

    #[error("solid list declares {capacity} objects but another object was started")]
    ObjectOverflow { capacity: usize },

    #[error("solid list declares {declared} objects but only {found} were found")]
    MissingObjects { declared: usize, found: usize },

    #[error("chunk 0x{0:08X} appeared outside of a solid object")]
    NoCurrentObject(u32),

    #[error("chunk 0x{0:08X} appeared before the mesh descriptor")]
    NoMesh(u32),

    #[error("texture assignment {index} is outside the {len} texture hashes of the object")]
    TextureHashOutOfRange { index: usize, len: usize },

    #[error("material {material} draws from vertex stream {stream} but the mesh has {len} buffers")]
    VertexStreamOutOfRange {
        material: usize,
        stream: usize,
        len: usize,
    },

    #[error("material table needs {needed} faces but the mesh holds {len}")]
    FaceOutOfRange { needed: usize, len: usize },

    #[error("material {index} does not exist, the mesh has {len} materials")]
    MaterialOutOfRange { index: usize, len: usize },

    #[error("texture pack holds {capacity} textures but more metadata records were found")]
    TextureOverflow { capacity: usize },

    #[error("texture pack declares {declared} textures but only {found} were described")]
    MissingTextures { declared: usize, found: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
