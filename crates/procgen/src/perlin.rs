//! Multi-octave Perlin terrain.
//!
//! Every cell depends only on its own coordinates and the seed, so the grid is
//! filled one row per task and the result does not depend on thread count.

use noise::{NoiseFn, Perlin};
use rayon::prelude::*;

use crate::grid::Grid;
use crate::params::GenerationParameters;
use crate::random::RandomSource;

/// Range the per-seed sampling offset is drawn from, on each axis.
const OFFSET_RANGE: f32 = 10_000.0;

/// Derive the u32 permutation seed for the noise table from a world seed.
/// Same seed always gives the same result so terrain is reproducible.
#[inline]
fn noise_table_seed(seed: u64) -> u32 {
    (seed.wrapping_mul(0x9e3779b97f4a7c15_u64) >> 32) as u32
}

#[derive(Clone)]
pub struct PerlinGenerator {
    perlin: Perlin,
    offset: [f64; 2],
    noise_scale: f64,
    octaves: u32,
    persistence: f64,
    lacunarity: f64,
    max_height: f64,
}

impl PerlinGenerator {
    /// Build from validated parameters. Non-positive octave counts are
    /// treated as a single octave; `GenerationParameters::validate` rejects
    /// them before this point in the pipeline.
    pub fn from_params(params: &GenerationParameters) -> Self {
        Self::new(
            params.seed,
            params.noise_scale,
            params.octaves.max(1) as u32,
            params.persistence,
            params.lacunarity,
            params.max_height,
        )
    }

    pub fn new(
        seed: u64,
        noise_scale: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
        max_height: f32,
    ) -> Self {
        let mut rng = RandomSource::new(seed);
        let offset_x = rng.next_float_range(-OFFSET_RANGE, OFFSET_RANGE);
        let offset_y = rng.next_float_range(-OFFSET_RANGE, OFFSET_RANGE);

        Self {
            perlin: Perlin::new(noise_table_seed(seed)),
            offset: [offset_x as f64, offset_y as f64],
            noise_scale: noise_scale as f64,
            octaves: octaves.max(1),
            persistence: persistence as f64,
            lacunarity: lacunarity as f64,
            max_height: max_height as f64,
        }
    }

    /// Height at grid coordinates `(x, y)`, in `[0, max_height]`.
    ///
    /// The octave sum is divided by the total amplitude before mapping, so the
    /// bound holds for any persistence and octave count.
    pub fn sample(&self, x: f64, y: f64) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves {
            let sx = x * frequency * self.noise_scale + self.offset[0];
            let sy = y * frequency * self.noise_scale + self.offset[1];
            value += self.perlin.get([sx, sy]) * amplitude;
            max_value += f64::abs(amplitude);

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        let normalized = (value / max_value).clamp(-1.0, 1.0);
        ((normalized + 1.0) * 0.5 * self.max_height) as f32
    }

    /// Overwrite every cell of `grid`.
    pub fn generate(&self, grid: &mut Grid) {
        let size = grid.size();
        if size == 0 {
            return;
        }
        grid.heights_mut()
            .par_chunks_mut(size)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, h) in row.iter_mut().enumerate() {
                    *h = self.sample(x as f64, y as f64);
                }
            });
    }
}
