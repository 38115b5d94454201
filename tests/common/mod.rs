//! Builders for synthetic archives.

#![allow(dead_code)]

use chunkpak::PADDING_SENTINEL;

/// Writes nested `{type, length, payload}` chunks, patching container lengths as they close.
#[derive(Default)]
pub struct ChunkWriter {
    buf: Vec<u8>,
    open: Vec<usize>,
}

impl ChunkWriter {
    pub fn begin(&mut self, ty: u32) -> &mut Self {
        self.buf.extend_from_slice(&ty.to_le_bytes());
        self.buf.extend_from_slice(&0u32.to_le_bytes());
        self.open.push(self.buf.len());
        self
    }

    pub fn chunk(&mut self, ty: u32, payload: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(&ty.to_le_bytes());
        self.buf
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(payload);
        self
    }

    pub fn end(&mut self) -> &mut Self {
        let start = self.open.pop().expect("no open container");
        let len = (self.buf.len() - start) as u32;
        self.buf[start - 4..start].copy_from_slice(&len.to_le_bytes());
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        assert!(self.open.is_empty(), "unclosed container");
        std::mem::take(&mut self.buf)
    }
}

/// Little-endian record builder.
#[derive(Default)]
pub struct Record(Vec<u8>);

impl Record {
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn f32s(mut self, vals: &[f32]) -> Self {
        for val in vals {
            self.0.extend_from_slice(&val.to_le_bytes());
        }
        self
    }

    /// A NUL-padded text field of exactly `len` bytes.
    pub fn fixed(mut self, text: &str, len: usize) -> Self {
        let mut field = text.as_bytes().to_vec();
        field.resize(len, 0);
        self.0.extend_from_slice(&field);
        self
    }

    pub fn u32(mut self, val: u32) -> Self {
        self.0.extend_from_slice(&val.to_le_bytes());
        self
    }

    pub fn u32s(mut self, vals: &[u32]) -> Self {
        for &val in vals {
            self = self.u32(val);
        }
        self
    }

    pub fn u16s(mut self, vals: &[u16]) -> Self {
        for val in vals {
            self.0.extend_from_slice(&val.to_le_bytes());
        }
        self
    }

    pub fn zeros(mut self, len: usize) -> Self {
        self.0.resize(self.0.len() + len, 0);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

pub fn padding(words: usize) -> Record {
    Record::default().u32s(&vec![PADDING_SENTINEL; words])
}

pub fn list_info(object_count: u32, pipeline_path: &str, class_type: &str) -> Vec<u8> {
    Record::default()
        .zeros(12)
        .u32(object_count)
        .fixed(pipeline_path, 56)
        .fixed(class_type, 32)
        .zeros(12)
        .build()
}

pub fn object_header(hash: u32, min: [f32; 3], max: [f32; 3], position: [f32; 3]) -> Record {
    Record::default()
        .zeros(16)
        .u32(hash)
        .zeros(12)
        .f32s(&min)
        .zeros(4)
        .f32s(&max)
        .zeros(4)
        .f32s(&[1.0, 0.0, 0.0, 0.0])
        .f32s(&[0.0, 1.0, 0.0, 0.0])
        .f32s(&[0.0, 0.0, 1.0, 0.0])
        .f32s(&position)
        .f32s(&[1.0])
        .zeros(32)
}

pub fn mesh_descriptor(num_materials: u32, num_vertex_buffers: u32, num_tris: u32) -> Record {
    Record::default()
        .zeros(16)
        .u32(num_materials)
        .zeros(4)
        .u32(num_vertex_buffers)
        .zeros(12)
        .u32(num_tris)
        .u32(num_tris * 3)
        .zeros(4)
}

pub fn material(
    hash: u32,
    stream_discriminant: u32,
    texture_assignment: u8,
    num_vertices: u32,
    num_tris: u32,
) -> Record {
    Record::default()
        .zeros(4)
        .u32(hash)
        .u32(stream_discriminant)
        .zeros(4)
        .f32s(&[-1.0, -1.0, -1.0])
        .f32s(&[1.0, 1.0, 1.0])
        .zeros(4)
        .bytes(&[texture_assignment, 0, 0, 0])
        .zeros(16)
        .u32(num_vertices)
        .u32(num_tris * 3)
        .u32(num_tris)
        .zeros(40)
}

pub fn pack_info(name: &str, pipeline_path: &str, hash: u32) -> Vec<u8> {
    Record::default()
        .u32(1)
        .fixed(name, 28)
        .fixed(pipeline_path, 60)
        .u32(hash)
        .build()
}

pub fn texture_metadata(
    texture_hash: u32,
    size: (u32, u32),
    data: (u32, u32),
    name: &str,
) -> Record {
    let (width, height) = size;
    let (data_offset, data_size) = data;
    let name_length = name.len() as u8 + 1;

    Record::default()
        .zeros(12)
        .u32(texture_hash)
        .u32(!texture_hash)
        .zeros(4)
        .u32(data_size)
        .zeros(4)
        .u32(width)
        .u32(height)
        .u32(1)
        .zeros(36)
        .u32(data_offset)
        .zeros(60)
        .bytes(&[name_length])
        .fixed(name, name_length as usize)
}

pub fn texture_type(dds_type: u32) -> Record {
    Record::default().zeros(12).u32(dds_type).zeros(16)
}
