use {
    crate::{
        solid::{Face, SolidMesh},
        Error,
    },
    log::trace,
    serde::{Deserialize, Serialize},
};

/// What rebuilding did for one material.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MaterialSpan {
    pub face_count: usize,
    pub first_face: usize,

    /// Global vertex count consumed by the materials before this one.
    pub first_vertex: usize,

    /// Added to every stream-local index of the material's faces.
    pub shift: i64,

    /// Vertices actually advanced in the material's buffer.
    pub vertex_count: usize,
}

impl SolidMesh {
    /// Moves every face index into the space of all vertex buffers laid end to end and flips the
    /// winding of non-degenerate triangles.
    ///
    /// Must run once, after the material table, vertex buffers and index buffer are decoded.
    /// Materials are processed in table order carrying the running vertex and face offsets; the
    /// buffers end up with their stride and vertex count known and their read position rewound.
    /// One [`MaterialSpan`] per processed material is kept in `spans`.
    ///
    /// Not idempotent: vertex counts accumulate and faces are rewritten again on every call.
    pub(crate) fn rebuild(&mut self) -> Result<(), Error> {
        let num_buffers = self.vertex_buffers.len();
        for (index, material) in self.materials.iter().enumerate() {
            let buffer = self
                .vertex_buffers
                .get_mut(material.vertex_stream_index)
                .ok_or(Error::VertexStreamOutOfRange {
                    material: index,
                    stream: material.vertex_stream_index,
                    len: num_buffers,
                })?;
            buffer.num_verts += material.num_vertices as usize;
        }

        let total_tris = self.num_tris as usize;
        let num_faces = self.faces.len();
        let mut spans = Vec::with_capacity(self.materials.len());
        let mut num_verts = 0usize;
        let mut cur_face_idx = 0usize;

        for (index, material) in self.materials.iter().enumerate() {
            let buffer = &mut self.vertex_buffers[material.vertex_stream_index];
            let stride = buffer.len().checked_div(buffer.num_verts).unwrap_or_default();
            let consumed = buffer.position.checked_div(stride).unwrap_or_default();
            let shift = num_verts as i64 - consumed as i64;

            buffer.stride = stride;

            let first_vertex = num_verts;
            if stride > 0 {
                for _ in 0..material.num_vertices {
                    if buffer.position >= buffer.len() {
                        break;
                    }

                    buffer.position += stride;
                    num_verts += 1;
                }
            }

            let face_count = material.num_tris as usize;
            let face_end = cur_face_idx + face_count;
            let faces = self
                .faces
                .get_mut(cur_face_idx..face_end)
                .ok_or(Error::FaceOutOfRange {
                    needed: face_end,
                    len: num_faces,
                })?;

            for face in faces {
                rewrite_face(face, shift);
                face.material_index = index as u8;
            }

            trace!(
                "Material {index}: {} vertices from stream {} (stride {stride}, shift {shift})",
                num_verts - first_vertex,
                material.vertex_stream_index
            );

            spans.push(MaterialSpan {
                face_count,
                first_face: cur_face_idx,
                first_vertex,
                shift,
                vertex_count: num_verts - first_vertex,
            });

            cur_face_idx = face_end;

            if cur_face_idx >= total_tris {
                break;
            }
        }

        for buffer in &mut self.vertex_buffers {
            buffer.rewind();
        }

        self.spans = spans;

        Ok(())
    }
}

/// Shifts a non-degenerate triangle and swaps its last two corners; degenerate triangles are kept.
fn rewrite_face(face: &mut Face, shift: i64) {
    if face.is_degenerate() {
        return;
    }

    let [a, b, c] = face.indices;
    let shifted = |index: u16| (shift + i64::from(index)) as u16;

    face.indices = [shifted(a), shifted(c), shifted(b)];
}
