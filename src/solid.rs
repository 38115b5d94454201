use {
    crate::rebuild::MaterialSpan,
    glam::{Vec2, Vec3},
    serde::{Deserialize, Serialize},
};

/// Number of floats a vertex record must hold for [`VertexBuffer::vertex`] to decode it.
pub const VERTEX_FIELDS: usize = 7;

/// One triangle of a mesh.
///
/// Indices are local to the vertex stream of the material until the mesh has been rebuilt, after
/// which they address the vertices of all buffers laid end to end.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Face {
    pub indices: [u16; 3],
    pub material_index: u8,
}

impl Face {
    /// Returns `true` when two corners share a vertex.
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;

        a == b || a == c || b == c
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MeshMaterial {
    pub hash: u32,
    pub max_point: Vec3,
    pub min_point: Vec3,

    /// Replaced by the material name chunk once it has been decoded.
    pub name: String,

    pub num_indices: u32,
    pub num_tris: u32,
    pub num_vertices: u32,
    pub texture_hash: u32,

    /// Index of the vertex buffer this material draws from.
    pub vertex_stream_index: usize,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SolidList {
    pub class_type: String,
    pub objects: Vec<SolidObject>,
    pub pipeline_path: String,
}

impl SolidList {
    pub fn object(&self, name: impl AsRef<str>) -> Option<&SolidObject> {
        let name = name.as_ref();

        self.objects.iter().find(|object| object.name == name)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SolidMesh {
    pub faces: Vec<Face>,
    pub flags: u32,
    pub materials: Vec<MeshMaterial>,
    pub num_materials: u32,
    pub num_tris: u32,
    pub num_vertex_buffers: u32,
    pub num_vertices: u32,

    /// What the rebuild did for each material; empty until every material is named.
    pub spans: Vec<MaterialSpan>,

    pub vertex_buffers: Vec<VertexBuffer>,
}

impl SolidMesh {
    /// Faces drawn with the material at `index`, in table order.
    pub fn material_faces(&self, index: usize) -> &[Face] {
        let start = self.materials[..index.min(self.materials.len())]
            .iter()
            .map(|material| material.num_tris as usize)
            .sum::<usize>()
            .min(self.faces.len());
        let len = self
            .materials
            .get(index)
            .map(|material| material.num_tris as usize)
            .unwrap_or_default();

        &self.faces[start..(start + len).min(self.faces.len())]
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SolidObject {
    pub hash: u32,
    pub max_point: Vec3,
    pub mesh: Option<SolidMesh>,
    pub min_point: Vec3,
    pub name: String,

    /// Translation column of the object transform.
    pub position: Vec3,

    pub texture_hashes: Vec<u32>,
}

impl Default for SolidObject {
    fn default() -> Self {
        Self {
            hash: 0,
            max_point: Vec3::ZERO,
            mesh: None,
            min_point: Vec3::ZERO,
            name: "UNNAMED".to_owned(),
            position: Vec3::ZERO,
            texture_hashes: vec![],
        }
    }
}

/// A decoded vertex record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Packed color, stored bit-for-bit in the fourth float slot.
    pub color: u32,

    pub position: Vec3,
    pub uv: Vec2,
}

/// Raw interleaved vertex data of one stream.
///
/// The stride is not stored in the archive; it becomes known once the mesh is rebuilt.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct VertexBuffer {
    data: Vec<f32>,
    pub(crate) num_verts: usize,
    pub(crate) position: usize,
    pub(crate) stride: usize,
}

impl VertexBuffer {
    pub fn new(data: Vec<f32>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Length of the buffer in floats.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of vertices the materials of the mesh draw from this buffer.
    pub fn num_verts(&self) -> usize {
        self.num_verts
    }

    /// Read position in floats.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Floats per vertex record.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Decodes vertex `index`; `None` past the end of the buffer or before the stride is known.
    ///
    /// Positions swap the y and z axes and the v coordinate is flipped.
    pub fn vertex(&self, index: usize) -> Option<Vertex> {
        if self.stride == 0 {
            return None;
        }

        let start = index.checked_mul(self.stride)?;
        let record = self.data.get(start..start.checked_add(VERTEX_FIELDS)?)?;

        Some(Vertex {
            color: record[3].to_bits(),
            position: Vec3::new(record[0], record[2], record[1]),
            uv: Vec2::new(record[5], -record[6]),
        })
    }

    /// Returns `true` when every vertex drawn from this buffer can be decoded.
    ///
    /// Strides below [`VERTEX_FIELDS`] floats leave the records too short.
    pub fn is_complete(&self) -> bool {
        self.vertices().count() == self.num_verts
    }

    /// Every vertex drawn from this buffer, in order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.num_verts).map_while(|index| self.vertex(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout() {
        let mut buf = VertexBuffer::new(vec![
            1.0,
            2.0,
            3.0,
            f32::from_bits(0xFF00_FF00),
            9.0,
            0.25,
            0.75,
            0.0,
            4.0,
            5.0,
            6.0,
            f32::from_bits(0x1234_5678),
            9.0,
            0.5,
            0.125,
            0.0,
        ]);
        buf.stride = 8;
        buf.num_verts = 2;

        let vertices = buf.vertices().collect::<Vec<_>>();

        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].position, Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(vertices[0].color, 0xFF00_FF00);
        assert_eq!(vertices[0].uv, Vec2::new(0.25, -0.75));
        assert_eq!(vertices[1].position, Vec3::new(4.0, 6.0, 5.0));
        assert_eq!(vertices[1].color, 0x1234_5678);
        assert_eq!(vertices[1].uv, Vec2::new(0.5, -0.125));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn vertex_without_stride() {
        let buf = VertexBuffer::new(vec![0.0; 14]);

        assert!(buf.vertex(0).is_none());
        assert_eq!(buf.vertices().count(), 0);
    }

    #[test]
    fn short_vertex_record() {
        let mut buf = VertexBuffer::new(vec![0.0; 10]);
        buf.stride = 5;
        buf.num_verts = 2;

        assert!(buf.vertex(0).is_some());
        assert!(buf.vertex(1).is_none());
        assert_eq!(buf.vertices().count(), 1);
    }

    #[test]
    fn degenerate_faces() {
        let face = |indices| Face {
            indices,
            material_index: 0,
        };

        assert!(!face([0, 1, 2]).is_degenerate());
        assert!(face([0, 0, 2]).is_degenerate());
        assert!(face([0, 1, 0]).is_degenerate());
        assert!(face([3, 1, 1]).is_degenerate());
    }

    #[test]
    fn material_face_ranges() {
        let mesh = SolidMesh {
            faces: (0..5)
                .map(|idx| Face {
                    indices: [idx, idx, idx],
                    material_index: 0,
                })
                .collect(),
            materials: vec![
                MeshMaterial {
                    num_tris: 2,
                    ..Default::default()
                },
                MeshMaterial {
                    num_tris: 3,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(mesh.material_faces(0).len(), 2);
        assert_eq!(mesh.material_faces(1)[0].indices, [2, 2, 2]);
        assert_eq!(mesh.material_faces(1).len(), 3);
        assert!(mesh.material_faces(2).is_empty());
    }
}
