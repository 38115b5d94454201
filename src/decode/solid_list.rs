use {
    crate::{
        chunk::{
            walk, Chunk, ChunkVisitor, MESH_DESCRIPTOR, MESH_INDEX_BUFFER, MESH_MATERIALS,
            MESH_MATERIAL_NAME, MESH_VERTEX_BUFFER, SOLID_LIST_INFO, SOLID_OBJECT,
            SOLID_OBJECT_HEADER, SOLID_TEXTURE_HASHES,
        },
        cursor::{fixed_str, ByteCursor},
        solid::{Face, MeshMaterial, SolidList, SolidMesh, SolidObject, VertexBuffer},
        Error,
    },
    bytemuck::{Pod, Zeroable},
    glam::{Mat4, Vec3},
    log::{debug, trace, warn},
    std::{io::SeekFrom, mem::size_of},
};

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ListInfoRecord {
    _blank: [u32; 2],
    _unknown1: u32,
    object_count: u32,
    pipeline_path: [u8; 0x38],
    class_type: [u8; 0x20],
    _blank2: [u32; 2],
    _unknown_offset: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectHeaderRecord {
    _blank: [u32; 3],
    _unknown1: u32,
    hash: u32,
    _num_tris: u32,
    _unknown2: [u32; 2],
    bounds_min: [f32; 4],
    bounds_max: [f32; 4],
    transform: [f32; 16],
    _blank2: [u32; 6],
    _unknown3: [f32; 2],
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MeshDescriptorRecord {
    _unknown1: [u32; 2],
    _unknown2: u32,
    flags: u32,
    num_materials: u32,
    _blank1: u32,
    num_vertex_buffers: u32,
    _blank2: [u32; 3],
    num_tris: u32,
    num_indices: u32,
    _blank3: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct MaterialRecord {
    _flags: u32,
    hash: u32,

    /// Changes value whenever the material starts drawing from the next vertex buffer.
    stream_discriminant: u32,

    _unknown2: u32,
    min_point: [f32; 3],
    max_point: [f32; 3],
    _unknown3: u32,
    texture_assignments: [u8; 4],
    _unknown4: [u8; 16],
    num_vertices: u32,
    num_indices: u32,
    num_tris: u32,
    _index_offset: u32,
    _unknown5: [u8; 36],
}

const _: () = assert!(size_of::<ListInfoRecord>() == 116);
const _: () = assert!(size_of::<ObjectHeaderRecord>() == 160);
const _: () = assert!(size_of::<MeshDescriptorRecord>() == 52);
const _: () = assert!(size_of::<MaterialRecord>() == 116);

/// Triangle count of a record: the explicit count, or one per three indices when it is zero.
fn tri_count(num_tris: u32, num_indices: u32) -> u32 {
    if num_tris == 0 {
        num_indices / 3
    } else {
        num_tris
    }
}

/// Decodes the solid list stored in the payload of a solid list container.
pub fn decode_solid_list(cursor: &ByteCursor<'_>, chunk: &Chunk) -> Result<SolidList, Error> {
    let mut decoder = SolidListDecoder::default();
    walk(cursor, chunk.offset, chunk.length, &mut decoder)?;

    decoder.finish()
}

/// Accumulates a [`SolidList`] from the chunks of one solid list container.
///
/// Objects occupy the slots sized by the list info record in the order their start markers are
/// seen. Every object-level chunk applies to the most recently started object.
#[derive(Default)]
pub struct SolidListDecoder {
    current: Option<usize>,
    list: SolidList,
    named_materials: usize,
    slots: Vec<Option<SolidObject>>,
    started: usize,
}

impl SolidListDecoder {
    /// Returns the decoded list once every declared object has been started.
    pub fn finish(self) -> Result<SolidList, Error> {
        let declared = self.slots.len();
        let objects = self
            .slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::MissingObjects {
                declared,
                found: self.started,
            })?;

        debug!(
            "Decoded solid list {} [{}]: {} objects",
            self.list.pipeline_path,
            self.list.class_type,
            objects.len()
        );

        Ok(SolidList {
            objects,
            ..self.list
        })
    }

    fn mesh(&mut self, ty: u32) -> Result<&mut SolidMesh, Error> {
        self.object(ty)?.mesh.as_mut().ok_or(Error::NoMesh(ty))
    }

    fn object(&mut self, ty: u32) -> Result<&mut SolidObject, Error> {
        let current = self.current;

        current
            .and_then(|idx| self.slots.get_mut(idx))
            .and_then(Option::as_mut)
            .ok_or(Error::NoCurrentObject(ty))
    }

    fn read_index_buffer(
        &mut self,
        chunk: &mut Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let mesh = self.mesh(chunk.ty)?;
        let len = mesh.faces.len();
        let mut face_idx = 0;

        for (material_idx, material) in mesh.materials.iter().enumerate() {
            let face_end = face_idx + material.num_tris as usize;
            let faces = mesh
                .faces
                .get_mut(face_idx..face_end)
                .ok_or(Error::FaceOutOfRange {
                    needed: face_end,
                    len,
                })?;

            for face in faces {
                face.material_index = material_idx as u8;
                face.indices = [cursor.read_u16()?, cursor.read_u16()?, cursor.read_u16()?];
            }

            face_idx = face_end;
        }

        trace!("Read {face_idx} faces");

        Ok(())
    }

    fn read_list_info(&mut self, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        let info: ListInfoRecord = cursor.read_pod()?;

        self.list.pipeline_path = fixed_str(&info.pipeline_path);
        self.list.class_type = fixed_str(&info.class_type);
        self.slots.resize_with(info.object_count as usize, || None);

        trace!(
            "Solid list {} [{}] declares {} objects",
            self.list.pipeline_path,
            self.list.class_type,
            self.slots.len()
        );

        Ok(())
    }

    fn read_material_name(
        &mut self,
        chunk: &Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        let index = self.named_materials;
        let name = cursor.read_string()?;
        let mesh = self.mesh(chunk.ty)?;
        let len = mesh.materials.len();
        let material = mesh
            .materials
            .get_mut(index)
            .ok_or(Error::MaterialOutOfRange { index, len })?;

        material.name = format!("{name}_{index}").replace(' ', "_");

        trace!("Material {index} is named {}", material.name);

        // Names are the last per-material chunks of a mesh
        if index + 1 == mesh.num_materials as usize {
            mesh.rebuild()?;
        }

        self.named_materials = index + 1;

        Ok(())
    }

    fn read_materials(
        &mut self,
        chunk: &mut Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let object = self.object(chunk.ty)?;
        let mesh = object.mesh.as_mut().ok_or(Error::NoMesh(chunk.ty))?;
        let mut vertex_stream_index = 0;
        let mut last_discriminant = 0;

        for idx in 0..mesh.num_materials as usize {
            let record: MaterialRecord = cursor.read_pod()?;

            if idx > 0 && record.stream_discriminant != last_discriminant {
                vertex_stream_index += 1;
            }

            last_discriminant = record.stream_discriminant;

            let assignment = record.texture_assignments[0] as usize;
            let texture_hash = *object.texture_hashes.get(assignment).ok_or(
                Error::TextureHashOutOfRange {
                    index: assignment,
                    len: object.texture_hashes.len(),
                },
            )?;
            let (min_point, max_point) = (record.min_point, record.max_point);

            mesh.num_vertices += record.num_vertices;
            mesh.materials.push(MeshMaterial {
                hash: record.hash,
                max_point: Vec3::from_array(max_point),
                min_point: Vec3::from_array(min_point),
                name: format!("unnamed-material-{texture_hash:08X}"),
                num_indices: record.num_indices,
                num_tris: tri_count(record.num_tris, record.num_indices),
                num_vertices: record.num_vertices,
                texture_hash,
                vertex_stream_index,
            });
        }

        trace!(
            "Read {} materials over {} vertex streams",
            mesh.materials.len(),
            vertex_stream_index + 1
        );

        Ok(())
    }

    fn read_mesh_descriptor(
        &mut self,
        chunk: &mut Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let descriptor: MeshDescriptorRecord = cursor.read_pod()?;
        let num_tris = tri_count(descriptor.num_tris, descriptor.num_indices);

        self.object(chunk.ty)?.mesh = Some(SolidMesh {
            faces: vec![Face::default(); num_tris as usize],
            flags: descriptor.flags,
            num_materials: descriptor.num_materials,
            num_tris,
            num_vertex_buffers: descriptor.num_vertex_buffers,
            ..Default::default()
        });

        trace!(
            "Mesh: {} materials, {} vertex buffers, {num_tris} triangles",
            { descriptor.num_materials },
            { descriptor.num_vertex_buffers }
        );

        Ok(())
    }

    fn read_object_header(
        &mut self,
        chunk: &mut Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let header: ObjectHeaderRecord = cursor.read_pod()?;

        // The name follows the fixed header
        let name = cursor.read_string()?;

        let (bounds_min, bounds_max) = (header.bounds_min, header.bounds_max);
        let transform = Mat4::from_cols_array(&{ header.transform });
        let object = self.object(chunk.ty)?;

        object.hash = header.hash;
        object.min_point = Vec3::new(bounds_min[0], bounds_min[1], bounds_min[2]);
        object.max_point = Vec3::new(bounds_max[0], bounds_max[1], bounds_max[2]);
        object.position = transform.w_axis.truncate();
        object.name = name;

        debug!("Solid object {} ({:08X})", object.name, object.hash);

        Ok(())
    }

    fn read_texture_hashes(
        &mut self,
        chunk: &Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        let object = self.object(chunk.ty)?;

        // Each entry is a hash followed by four unused bytes
        for _ in 0..chunk.length / 8 {
            object.texture_hashes.push(cursor.read_u32()?);
            cursor.seek(SeekFrom::Current(4))?;
        }

        Ok(())
    }

    fn read_vertex_buffer(
        &mut self,
        chunk: &mut Chunk,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), Error> {
        cursor.align_padding(chunk);

        let data = cursor.read_f32s(chunk.length / 4)?;
        let mesh = self.mesh(chunk.ty)?;

        if mesh.vertex_buffers.len() >= mesh.num_vertex_buffers as usize {
            warn!(
                "Mesh declares {} vertex buffers but found another",
                mesh.num_vertex_buffers
            );
        }

        trace!(
            "Vertex buffer {}: {} floats",
            mesh.vertex_buffers.len(),
            data.len()
        );

        mesh.vertex_buffers.push(VertexBuffer::new(data));

        Ok(())
    }

    fn start_object(&mut self) -> Result<(), Error> {
        let idx = self.started;
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(idx)
            .ok_or(Error::ObjectOverflow { capacity })?;

        *slot = Some(SolidObject::default());

        self.current = Some(idx);
        self.named_materials = 0;
        self.started += 1;

        Ok(())
    }
}

impl ChunkVisitor for SolidListDecoder {
    fn enter(&mut self, chunk: &Chunk) -> Result<(), Error> {
        if chunk.ty == SOLID_OBJECT {
            self.start_object()?;
        }

        Ok(())
    }

    fn visit(&mut self, chunk: &mut Chunk, cursor: &mut ByteCursor<'_>) -> Result<(), Error> {
        match chunk.ty {
            SOLID_LIST_INFO => self.read_list_info(cursor),
            SOLID_OBJECT_HEADER => self.read_object_header(chunk, cursor),
            SOLID_TEXTURE_HASHES => self.read_texture_hashes(chunk, cursor),
            MESH_DESCRIPTOR => self.read_mesh_descriptor(chunk, cursor),
            MESH_VERTEX_BUFFER => self.read_vertex_buffer(chunk, cursor),
            MESH_MATERIALS => self.read_materials(chunk, cursor),
            MESH_INDEX_BUFFER => self.read_index_buffer(chunk, cursor),
            MESH_MATERIAL_NAME => self.read_material_name(chunk, cursor),
            _ => Ok(()),
        }
    }
}
