// Decodes archive files and lists their contents, optionally exporting meshes and textures.
//
// Set RUST_LOG=chunkpak=trace to see every chunk as it is decoded.

use {
    anyhow::Context,
    chunkpak::{
        export::{export, ExportConfig},
        Archive, Resource,
    },
    clap::Parser,
    glob::glob,
    log::info,
    std::{fs::read, path::PathBuf, time::Instant},
};

#[derive(Parser)]
#[command(name = "chunk-explorer")]
struct Args {
    /// Export settings toml; exporting is enabled when this or `--output` is given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export directory, overriding the config's `output_dir`.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Archive files or glob patterns.
    #[arg(required = true)]
    inputs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Some(ExportConfig::load(path)?),
        None => args.output.is_some().then(ExportConfig::default),
    };

    if let (Some(config), Some(output_dir)) = (&mut config, args.output) {
        config.output_dir = output_dir;
    }

    for pattern in &args.inputs {
        for path in glob(pattern).context("Invalid file pattern")? {
            let path = path.context("Unable to read matched path")?;
            let data = read(&path).with_context(|| format!("Reading {}", path.display()))?;

            let started = Instant::now();
            let archive = Archive::from_bytes(&data)
                .with_context(|| format!("Decoding {}", path.display()))?;

            info!(
                "Stream length: {}, decoded in {} ms",
                data.len(),
                started.elapsed().as_millis()
            );

            println!("{}", path.display());

            for resource in archive.resources() {
                match resource {
                    Resource::TexturePack(pack) => {
                        println!("  Texture Pack: {} [{}]", pack.name, pack.pipeline_path);

                        for texture in &pack.textures {
                            println!(
                                "    {:08X} {} {}x{}",
                                texture.texture_hash, texture.name, texture.width, texture.height
                            );
                        }
                    }
                    Resource::SolidList(list) => {
                        println!("  Solid List: {} [{}]", list.pipeline_path, list.class_type);

                        for object in &list.objects {
                            let (vertices, tris) = object.mesh.as_ref().map_or((0, 0), |mesh| {
                                (mesh.num_vertices, mesh.num_tris)
                            });

                            println!(
                                "    {:08X} {} ({vertices} vertices, {tris} triangles)",
                                object.hash, object.name
                            );
                        }
                    }
                }
            }

            if let Some(config) = &config {
                export(&archive, config)?;
            }
        }
    }

    Ok(())
}
