//! Writes decoded archives out as Wavefront OBJ/MTL meshes and DDS textures.

mod dds;
mod obj;

pub use self::{
    dds::{write_dds, DDS_MAGIC},
    obj::{texture_file_name, write_mtl, write_obj},
};

use {
    crate::{solid::VertexBuffer, Archive},
    anyhow::Context,
    log::{info, warn},
    serde::Deserialize,
    std::{
        fs::{create_dir_all, read_to_string, File},
        io::{BufWriter, Write},
        path::{Path, PathBuf},
    },
};

/// Settings for [`export`], usually read from a toml file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Write `<name>.obj` and `<name>.mtl` for every solid object with a mesh.
    pub meshes: bool,

    pub output_dir: PathBuf,

    /// Directory the MTL texture maps point into, relative to the MTL file.
    pub texture_dir: PathBuf,

    /// Write `<HASH>.dds` for every texture.
    pub textures: bool,
}

impl ExportConfig {
    /// Reads a toml config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let str = read_to_string(path).context("Reading export config")?;

        Self::from_toml_str(&str)
    }

    pub fn from_toml_str(str: &str) -> anyhow::Result<Self> {
        toml::from_str(str).context("Parsing export config toml")
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            meshes: true,
            output_dir: PathBuf::from("."),
            texture_dir: PathBuf::new(),
            textures: true,
        }
    }
}

/// Counts of files written by [`export`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExportSummary {
    pub meshes: usize,
    pub textures: usize,
}

/// Writes every texture and solid object of `archive` into the configured output directory.
pub fn export(archive: &Archive, config: &ExportConfig) -> anyhow::Result<ExportSummary> {
    create_dir_all(&config.output_dir).context("Creating output directory")?;

    let mut summary = ExportSummary::default();

    if config.textures {
        for pack in archive.texture_packs() {
            for texture in &pack.textures {
                let Some(data) = pack.texture_data(texture) else {
                    warn!("Skipping texture {}", texture.name);
                    continue;
                };

                let path = config
                    .output_dir
                    .join(texture_file_name(texture.texture_hash));
                let mut writer = BufWriter::new(File::create(&path).context("Creating DDS file")?);
                write_dds(texture, data, &mut writer).context("Writing DDS file")?;
                writer.flush().context("Flushing DDS file")?;

                summary.textures += 1;
            }
        }
    }

    if config.meshes {
        for object in archive.solid_lists().flat_map(|list| &list.objects) {
            let Some(mesh) = &object.mesh else {
                warn!("Skipping object {} without a mesh", object.name);
                continue;
            };

            if !mesh.vertex_buffers.iter().all(VertexBuffer::is_complete) {
                warn!("Skipping object {} with undecodable vertices", object.name);
                continue;
            }

            let name = file_stem(&object.name);
            let mtllib = format!("{name}.mtl");

            let path = config.output_dir.join(&mtllib);
            let mut writer = BufWriter::new(File::create(&path).context("Creating MTL file")?);
            write_mtl(object, &config.texture_dir, &mut writer).context("Writing MTL file")?;
            writer.flush().context("Flushing MTL file")?;

            let path = config.output_dir.join(format!("{name}.obj"));
            let mut writer = BufWriter::new(File::create(&path).context("Creating OBJ file")?);
            write_obj(object, &mtllib, &mut writer).context("Writing OBJ file")?;
            writer.flush().context("Flushing OBJ file")?;

            summary.meshes += 1;
        }
    }

    info!(
        "Exported {} meshes and {} textures to {}",
        summary.meshes,
        summary.textures,
        config.output_dir.display()
    );

    Ok(summary)
}

/// Object names may contain path separators.
fn file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
