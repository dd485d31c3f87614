//! Generate a terrain heightmap and write it out as a grayscale PNG.
//!
//! Usage: `landscapify [config.ron] [output_dir]`. A missing config file is
//! written out with default settings.

mod config;

use anyhow::{Context, Result};
use procgen::{generate_heightmap, next_available_path};
use std::path::PathBuf;

use crate::config::{default_config_path, LandscapeConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from).unwrap_or_else(default_config_path);
    let mut config = LandscapeConfig::load(&config_path);
    if !config_path.exists() {
        // Leave an editable starter config behind.
        config.save(&config_path);
    }
    if let Some(dir) = args.next() {
        config.output_dir = PathBuf::from(dir);
    }

    log::info!(
        "Generating {0}x{0} terrain with {1:?}",
        config.terrain.size,
        config.terrain.algorithm
    );
    let terrain = generate_heightmap(&config.terrain).context("terrain generation failed")?;

    let path = next_available_path(&config.output_dir, &config.file_stem, "png")
        .with_context(|| format!("cannot prepare output directory {:?}", config.output_dir))?;
    terrain
        .heightmap
        .save_png(&path)
        .with_context(|| format!("failed to write heightmap to {:?}", path))?;

    log::info!(
        "Mesh: {} vertices, {} triangles",
        terrain.mesh.vertex_count(),
        terrain.mesh.triangle_count()
    );
    Ok(())
}
