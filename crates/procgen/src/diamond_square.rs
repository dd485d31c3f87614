//! Diamond-Square midpoint displacement.
//!
//! Each level halves the square side and the displacement amplitude. Levels
//! run strictly in order because every pass reads heights written by the
//! previous one; within a level cells are visited row-major so the random
//! draws are reproducible.

use crate::error::ConfigError;
use crate::grid::Grid;
use crate::params::{exponent_from_size, CornerHeights, GenerationParameters, ReseedPolicy};
use crate::random::RandomSource;

/// Where the four corner heights come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerInit {
    Fixed(CornerHeights),
    /// Each corner drawn uniformly from `[-max_height, max_height]`.
    Random { max_height: f32 },
}

#[derive(Debug, Clone)]
pub struct DiamondSquareGenerator {
    pub seed: u64,
    pub height_multiplier: f32,
    pub corners: CornerInit,
    pub reseed_policy: ReseedPolicy,
}

impl DiamondSquareGenerator {
    pub fn from_params(params: &GenerationParameters) -> Self {
        let corners = if params.override_corners {
            CornerInit::Fixed(params.corner_heights)
        } else {
            CornerInit::Random {
                max_height: params.max_random_init_height,
            }
        };
        Self {
            seed: params.seed,
            height_multiplier: params.height_multiplier,
            corners,
            reseed_policy: params.reseed_policy,
        }
    }

    /// Fill every cell of `grid`. The grid edge must be `2^k + 1`.
    pub fn generate(&self, grid: &mut Grid) -> Result<(), ConfigError> {
        let size = grid.size();
        if u32::try_from(size).ok().and_then(exponent_from_size).is_none() {
            return Err(ConfigError::InvalidSize {
                size: u32::try_from(size).unwrap_or(u32::MAX),
            });
        }

        self.init_corners(grid);

        let mut threaded = RandomSource::new(self.seed);
        self.subdivide(grid, size - 1, self.height_multiplier, &mut threaded);
        Ok(())
    }

    fn init_corners(&self, grid: &mut Grid) {
        let last = grid.size() - 1;
        let [tl, tr, bl, br] = match self.corners {
            CornerInit::Fixed(c) => c.to_array(),
            CornerInit::Random { max_height } => {
                let mut rng = RandomSource::new(self.seed);
                std::array::from_fn(|_| rng.next_float_range(-max_height, max_height))
            }
        };
        grid.set_height(0, 0, tl);
        grid.set_height(last, 0, tr);
        grid.set_height(0, last, bl);
        grid.set_height(last, last, br);
    }

    fn subdivide(&self, grid: &mut Grid, step: usize, scale: f32, threaded: &mut RandomSource) {
        if step <= 1 {
            return;
        }

        let mut fresh;
        let rng = match self.reseed_policy {
            ReseedPolicy::PerLevel => {
                fresh = RandomSource::new(self.seed);
                &mut fresh
            }
            ReseedPolicy::Threaded => &mut *threaded,
        };

        square_pass(grid, step, scale, rng);
        diamond_pass(grid, step, scale, rng);
        log::debug!("diamond-square level step={step} scale={scale}");

        self.subdivide(grid, step / 2, scale / 2.0, threaded);
    }
}

/// Centre of every `step`-sized square gets the mean of its four diagonal
/// corners plus a displacement in `[-scale, scale]`.
fn square_pass(grid: &mut Grid, step: usize, scale: f32, rng: &mut RandomSource) {
    let size = grid.size();
    let half = step / 2;

    for y in (half..size).step_by(step) {
        for x in (half..size).step_by(step) {
            let avg = (grid.get_height(x - half, y - half)
                + grid.get_height(x + half, y - half)
                + grid.get_height(x - half, y + half)
                + grid.get_height(x + half, y + half))
                / 4.0;
            grid.set_height(x, y, avg + rng.next_float_range(-scale, scale));
        }
    }
}

/// Edge midpoints get the mean of their four axis neighbours at `step / 2`.
/// A neighbour that falls off the grid is replaced by the one on the opposite
/// side of the cell.
fn diamond_pass(grid: &mut Grid, step: usize, scale: f32, rng: &mut RandomSource) {
    let size = grid.size();
    let half = step / 2;

    for y in (0..size).step_by(half) {
        for x in ((y + half) % step..size).step_by(step) {
            let left = if x < half { x + half } else { x - half };
            let right = if x + half >= size { x - half } else { x + half };
            let top = if y < half { y + half } else { y - half };
            let bottom = if y + half >= size { y - half } else { y + half };

            let avg = (grid.get_height(left, y)
                + grid.get_height(right, y)
                + grid.get_height(x, top)
                + grid.get_height(x, bottom))
                / 4.0;
            grid.set_height(x, y, avg + rng.next_float_range(-scale, scale));
        }
    }
}
