use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use quantmesh::prelude::{encode_draw_mesh, ConfigType, PassThrough, QuantizationParams};
use quantmesh::encode::Config;

#[derive(Parser)]
#[command(name = "quantmesh")]
#[command(about = "Compresses the texture batches of an OBJ mesh into quantized mesh streams")]
struct Cli {
    /// Input OBJ file path
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the streams and the manifest are written to
    #[arg(short, long)]
    output_dir: PathBuf,

    #[arg(long)]
    position_bits: Option<u8>,

    #[arg(long)]
    texcoord_bits: Option<u8>,

    #[arg(long)]
    normal_bits: Option<u8>,
}

impl Cli {
    fn config(&self) -> Config {
        let default = Config::default();
        Config {
            position_bits: self.position_bits.unwrap_or(default.position_bits),
            texcoord_bits: self.texcoord_bits.unwrap_or(default.texcoord_bits),
            normal_bits: self.normal_bits.unwrap_or(default.normal_bits),
        }
    }
}

/// One entry of the manifest per written stream.
#[derive(Serialize)]
struct BatchEntry {
    texture: String,
    file: String,
    vertex_count: usize,
    triangle_count: usize,
    params: QuantizationParams,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let input_ext = cli.input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    if input_ext != "obj" {
        anyhow::bail!("Input file must be a .obj file");
    }
    let stem = cli.input
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Input file name is not valid UTF-8")?
        .to_owned();

    let batches = quantmesh::io::obj::load_obj(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    info!("Loaded {} texture batches from {}", batches.len(), cli.input.display());

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create {}", cli.output_dir.display()))?;

    let config = cli.config();
    let mut manifest = Vec::new();
    for (index, (texture, draw_mesh)) in batches.iter().enumerate() {
        if draw_mesh.is_empty() {
            continue;
        }
        let encoded = encode_draw_mesh(draw_mesh, &mut PassThrough, &config)
            .with_context(|| format!("Failed to encode the batch of texture {:?}", texture))?;

        let file = format!("{}_{}.qm", stem, index);
        write_file(&cli.output_dir.join(&file), &encoded.bytes)?;
        info!(
            "{}: {} vertices, {} triangles, {} bytes",
            file, encoded.vertex_count, encoded.triangle_count, encoded.bytes.len()
        );

        manifest.push(BatchEntry {
            texture: texture.to_owned(),
            file,
            vertex_count: encoded.vertex_count,
            triangle_count: encoded.triangle_count,
            params: encoded.params,
        });
    }

    let manifest = serde_json::to_vec_pretty(&manifest)?;
    write_file(&cli.output_dir.join(format!("{}.json", stem)), &manifest)?;

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))
}
