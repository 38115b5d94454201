use {
    crate::solid::SolidObject,
    std::{
        io::{Error, ErrorKind, Write},
        path::Path,
    },
};

/// File name of the DDS export for a texture hash.
pub fn texture_file_name(texture_hash: u32) -> String {
    format!("{texture_hash:08X}.dds")
}

/// Writes one `newmtl` block per material of the object's mesh.
///
/// Texture maps point at `<texture_dir>/<HASH>.dds`.
pub fn write_mtl(
    object: &SolidObject,
    texture_dir: impl AsRef<Path>,
    mut writer: impl Write,
) -> Result<(), Error> {
    let Some(mesh) = &object.mesh else {
        return Ok(());
    };

    for material in &mesh.materials {
        let texture = texture_dir
            .as_ref()
            .join(texture_file_name(material.texture_hash));
        let texture = texture.display();

        writeln!(writer, "newmtl {}", material.name)?;
        writeln!(writer, "Ka 255 255 255")?;
        writeln!(writer, "Kd 255 255 255")?;
        writeln!(writer, "Ks 255 255 255")?;
        writeln!(writer, "map_Ka {texture}")?;
        writeln!(writer, "map_Kd {texture}")?;
        writeln!(writer, "map_Ks {texture}")?;
    }

    Ok(())
}

/// Writes the object as a Wavefront OBJ group referencing the material library `mtllib`.
///
/// Vertices of every buffer are written in buffer order, so face indices are the rebuilt global
/// indices plus one. Fails with [`ErrorKind::InvalidData`] before writing anything when a vertex
/// buffer holds records too short to decode.
pub fn write_obj(object: &SolidObject, mtllib: &str, mut writer: impl Write) -> Result<(), Error> {
    let short_buffer = object
        .mesh
        .iter()
        .flat_map(|mesh| mesh.vertex_buffers.iter().enumerate())
        .find(|(_, buffer)| !buffer.is_complete());

    if let Some((idx, buffer)) = short_buffer {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "object {} buffer {idx} decodes {} of {} vertices (stride {})",
                object.name,
                buffer.vertices().count(),
                buffer.num_verts(),
                buffer.stride()
            ),
        ));
    }

    writeln!(writer, "g {}", object.name)?;
    writeln!(writer, "mtllib {mtllib}")?;

    let Some(mesh) = &object.mesh else {
        return Ok(());
    };

    for buffer in &mesh.vertex_buffers {
        let num_verts = buffer.num_verts();

        for (idx, vertex) in buffer.vertices().enumerate() {
            let [x, y, z] = vertex.position.to_array();
            let [u, v] = vertex.uv.to_array();

            writeln!(writer, "# buffer - {}/{num_verts}", idx + 1)?;
            writeln!(writer, "v {x:.6} {y:.6} {z:.6}")?;
            writeln!(writer, "vt {u:.6} {v:.6}")?;
        }
    }

    for (idx, material) in mesh.materials.iter().enumerate() {
        writeln!(writer, "usemtl {}", material.name)?;

        for face in mesh.material_faces(idx) {
            let [a, b, c] = face.indices.map(|index| u32::from(index) + 1);

            writeln!(writer, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }
    }

    Ok(())
}
