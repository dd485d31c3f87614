//! Heightmap generation pipeline.
//!
//! **Seed-based determinism:** every random draw is derived from
//! `params.seed`, so identical parameters always yield bit-identical grids,
//! meshes and rasters regardless of thread count.

use std::sync::Arc;
use std::time::Instant;

use crate::diamond_square::DiamondSquareGenerator;
use crate::error::Result;
use crate::grid::Grid;
use crate::heightmap::{HeightmapEncoder, HeightmapImage};
use crate::mesh::{MeshBuilder, MeshSection};
use crate::params::{Algorithm, GenerationParameters, ParamsKey};
use crate::perlin::PerlinGenerator;

/// Everything one generation run produces.
#[derive(Debug, Clone)]
pub struct GeneratedTerrain {
    pub params: GenerationParameters,
    pub grid: Grid,
    pub mesh: MeshSection,
    pub heightmap: HeightmapImage,
}

/// Validate `params`, fill a grid with the selected algorithm, then derive the
/// mesh and the heightmap raster from it.
///
/// Invalid parameters are rejected before the grid is allocated.
pub fn generate_heightmap(params: &GenerationParameters) -> Result<GeneratedTerrain> {
    params.validate()?;
    let started = Instant::now();

    let mut grid = Grid::with_spacing(params.size as usize, params.vertex_spacing);
    match params.algorithm {
        Algorithm::DiamondSquare => DiamondSquareGenerator::from_params(params).generate(&mut grid)?,
        Algorithm::PerlinNoise => PerlinGenerator::from_params(params).generate(&mut grid),
    }

    let mesh = MeshBuilder::new(params.compute_normals).build(&grid);
    let heightmap = HeightmapEncoder::encode(&grid, params.bit_depth);

    log::info!(
        "Generated {0}x{0} {1:?} terrain (seed {2}): heights {3:.2}..{4:.2}, {5} triangles in {6:.1?}",
        params.size,
        params.algorithm,
        params.seed,
        heightmap.min_height,
        heightmap.max_height,
        mesh.triangle_count(),
        started.elapsed()
    );

    Ok(GeneratedTerrain {
        params: params.clone(),
        grid,
        mesh,
        heightmap,
    })
}

/// Regenerates only when the parameters change.
///
/// The last result is kept keyed on every parameter field, so a change to any
/// of them (not just the size) triggers a fresh run.
#[derive(Debug, Default)]
pub struct TerrainGenerator {
    cached: Option<(ParamsKey, Arc<GeneratedTerrain>)>,
}

impl TerrainGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self, params: &GenerationParameters) -> Result<Arc<GeneratedTerrain>> {
        let key = params.cache_key();
        if let Some((cached_key, terrain)) = &self.cached {
            if *cached_key == key {
                log::debug!("Terrain parameters unchanged, reusing cached result");
                return Ok(Arc::clone(terrain));
            }
        }

        let terrain = Arc::new(generate_heightmap(params)?);
        self.cached = Some((key, Arc::clone(&terrain)));
        Ok(terrain)
    }

    /// Most recent successful result, if any.
    pub fn last(&self) -> Option<&Arc<GeneratedTerrain>> {
        self.cached.as_ref().map(|(_, terrain)| terrain)
    }

    /// Drop the cached result so the next call always regenerates.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
