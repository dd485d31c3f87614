//! Generation parameters and their validation.
//!
//! A `GenerationParameters` value is immutable for one generation run. It is
//! validated up front so that the generators themselves never see a grid size
//! that fails to tile or noise settings that overflow.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::heightmap::BitDepth;

/// Smallest supported size exponent (4x4 cells, 5x5 vertices).
pub const MIN_SIZE_EXPONENT: u32 = 2;
/// Largest supported size exponent (8192x8192 cells).
pub const MAX_SIZE_EXPONENT: u32 = 13;
/// Octaves beyond this add nothing visible and only cost time.
pub const MAX_OCTAVES: i32 = 32;

/// Which synthesis algorithm fills the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    DiamondSquare,
    PerlinNoise,
}

/// How Diamond-Square draws its displacements across recursion levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReseedPolicy {
    /// A fresh generator seeded with the run seed at every level, so each
    /// level replays the same displacement sequence scaled by its amplitude.
    #[default]
    PerLevel,
    /// One generator advanced across all levels.
    Threaded,
}

/// Corner heights used when `override_corners` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerHeights {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerHeights {
    pub fn uniform(height: f32) -> Self {
        Self {
            top_left: height,
            top_right: height,
            bottom_left: height,
            bottom_right: height,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.top_left, self.top_right, self.bottom_left, self.bottom_right]
    }
}

impl Default for CornerHeights {
    fn default() -> Self {
        Self::uniform(1000.0)
    }
}

/// Everything needed for one heightmap generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    /// Vertices per side, `2^k + 1` with k in [2, 13].
    pub size: u32,
    /// Seed shared by every random draw of the run.
    pub seed: u64,
    pub algorithm: Algorithm,
    /// World distance between neighbouring vertices.
    pub vertex_spacing: f32,
    /// Compute per-vertex normals for the mesh.
    pub compute_normals: bool,
    /// Sample depth of the encoded heightmap.
    pub bit_depth: BitDepth,

    // Diamond-Square
    /// Initial displacement amplitude; halves every recursion level.
    pub height_multiplier: f32,
    /// Use `corner_heights` instead of random corners.
    pub override_corners: bool,
    pub corner_heights: CornerHeights,
    /// Random corners are drawn from [-max, max].
    pub max_random_init_height: f32,
    pub reseed_policy: ReseedPolicy,

    // Perlin noise
    /// Base sampling frequency in noise space per cell.
    pub noise_scale: f32,
    pub octaves: i32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Heights are mapped into [0, max_height].
    pub max_height: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            size: (1 << 7) + 1,
            seed: 1234567890,
            algorithm: Algorithm::DiamondSquare,
            vertex_spacing: 10.0,
            compute_normals: true,
            bit_depth: BitDepth::Eight,
            height_multiplier: 50.0,
            override_corners: false,
            corner_heights: CornerHeights::default(),
            max_random_init_height: 100.0,
            reseed_policy: ReseedPolicy::PerLevel,
            noise_scale: 0.1,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            max_height: 500.0,
        }
    }
}

/// Edge length for a size exponent: `2^k + 1`.
pub fn size_from_exponent(exponent: u32) -> Result<u32, ConfigError> {
    if !(MIN_SIZE_EXPONENT..=MAX_SIZE_EXPONENT).contains(&exponent) {
        return Err(ConfigError::UnsupportedExponent { exponent });
    }
    Ok((1 << exponent) + 1)
}

/// Inverse of [`size_from_exponent`]; `None` if `size` is not a supported edge length.
pub fn exponent_from_size(size: u32) -> Option<u32> {
    let cells = size.checked_sub(1)?;
    if !cells.is_power_of_two() {
        return None;
    }
    let exponent = cells.trailing_zeros();
    (MIN_SIZE_EXPONENT..=MAX_SIZE_EXPONENT)
        .contains(&exponent)
        .then_some(exponent)
}

impl GenerationParameters {
    /// Default parameters with an edge length of `2^exponent + 1`.
    pub fn from_exponent(exponent: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            size: size_from_exponent(exponent)?,
            ..Default::default()
        })
    }

    /// Reject anything that would make generation tile unevenly or overflow.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if exponent_from_size(self.size).is_none() {
            return Err(ConfigError::InvalidSize { size: self.size });
        }
        require_finite("vertex_spacing", self.vertex_spacing)?;

        match self.algorithm {
            Algorithm::DiamondSquare => {
                require_finite("height_multiplier", self.height_multiplier)?;
                if self.override_corners {
                    for h in self.corner_heights.to_array() {
                        require_finite("corner_heights", h)?;
                    }
                } else {
                    require_finite("max_random_init_height", self.max_random_init_height)?;
                }
            }
            Algorithm::PerlinNoise => {
                if self.octaves <= 0 {
                    return Err(ConfigError::NonPositiveOctaves {
                        octaves: self.octaves,
                    });
                }
                if self.octaves > MAX_OCTAVES {
                    return Err(ConfigError::TooManyOctaves {
                        octaves: self.octaves,
                        max: MAX_OCTAVES,
                    });
                }
                require_finite("noise_scale", self.noise_scale)?;
                require_finite("persistence", self.persistence)?;
                require_finite("lacunarity", self.lacunarity)?;
                require_finite("max_height", self.max_height)?;
                self.check_accumulation()?;
            }
        }
        Ok(())
    }

    /// Walk the octave recurrence once and make sure amplitude, frequency and
    /// the largest sample coordinate all stay finite.
    fn check_accumulation(&self) -> Result<(), ConfigError> {
        let extent = (self.size - 1) as f64 * self.noise_scale.abs() as f64;
        let mut amplitude = 1.0_f64;
        let mut frequency = 1.0_f64;
        let mut amplitude_sum = 0.0_f64;

        for _ in 0..self.octaves {
            amplitude_sum += amplitude.abs();
            let coord = extent * frequency.abs();
            if !amplitude.is_finite() || !amplitude_sum.is_finite() || !coord.is_finite() {
                return Err(ConfigError::NonFiniteAccumulation {
                    persistence: self.persistence,
                    lacunarity: self.lacunarity,
                });
            }
            amplitude *= self.persistence as f64;
            frequency *= self.lacunarity as f64;
        }
        Ok(())
    }

    /// Bitwise-exact key over every field, for memoising regeneration.
    pub fn cache_key(&self) -> ParamsKey {
        let c = self.corner_heights;
        ParamsKey {
            size: self.size,
            seed: self.seed,
            algorithm: self.algorithm,
            reseed_policy: self.reseed_policy,
            bit_depth: self.bit_depth,
            flags: (self.compute_normals, self.override_corners),
            octaves: self.octaves,
            floats: [
                self.vertex_spacing.to_bits(),
                self.height_multiplier.to_bits(),
                c.top_left.to_bits(),
                c.top_right.to_bits(),
                c.bottom_left.to_bits(),
                c.bottom_right.to_bits(),
                self.max_random_init_height.to_bits(),
                self.noise_scale.to_bits(),
                self.persistence.to_bits(),
                self.lacunarity.to_bits(),
                self.max_height.to_bits(),
            ],
        }
    }
}

fn require_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

/// Hashable identity of a [`GenerationParameters`] value.
///
/// Floats are compared by bit pattern, so `0.0` and `-0.0` are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamsKey {
    size: u32,
    seed: u64,
    algorithm: Algorithm,
    reseed_policy: ReseedPolicy,
    bit_depth: BitDepth,
    flags: (bool, bool),
    octaves: i32,
    floats: [u32; 11],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_maps_to_power_of_two_plus_one() {
        assert_eq!(size_from_exponent(2), Ok(5));
        assert_eq!(size_from_exponent(13), Ok(8193));
        assert_eq!(
            size_from_exponent(1),
            Err(ConfigError::UnsupportedExponent { exponent: 1 })
        );
        assert_eq!(exponent_from_size(129), Some(7));
        assert_eq!(exponent_from_size(128), None);
        assert_eq!(exponent_from_size(3), None);
        assert_eq!(exponent_from_size(0), None);
    }

    #[test]
    fn from_exponent_sets_size_and_keeps_defaults() {
        let params = GenerationParameters::from_exponent(2).unwrap();
        assert_eq!(params.size, 5);
        assert_eq!(params.seed, GenerationParameters::default().seed);
        assert_eq!(
            GenerationParameters::from_exponent(14),
            Err(ConfigError::UnsupportedExponent { exponent: 14 })
        );
    }

    #[test]
    fn defaults_are_valid() {
        let params = GenerationParameters::default();
        assert!(params.validate().is_ok());
        let perlin = GenerationParameters {
            algorithm: Algorithm::PerlinNoise,
            ..Default::default()
        };
        assert!(perlin.validate().is_ok());
    }

    #[test]
    fn rejects_size_that_does_not_tile() {
        for size in [0, 1, 3, 4, 6, 64, 100, 16385] {
            let params = GenerationParameters {
                size,
                ..Default::default()
            };
            assert_eq!(params.validate(), Err(ConfigError::InvalidSize { size }));
        }
    }

    #[test]
    fn rejects_non_positive_octaves_for_perlin() {
        let params = GenerationParameters {
            algorithm: Algorithm::PerlinNoise,
            octaves: 0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::NonPositiveOctaves { octaves: 0 })
        );
    }

    #[test]
    fn rejects_octave_count_above_limit() {
        for octaves in [MAX_OCTAVES + 1, i32::MAX] {
            let params = GenerationParameters {
                algorithm: Algorithm::PerlinNoise,
                octaves,
                lacunarity: 1.0,
                ..Default::default()
            };
            assert_eq!(
                params.validate(),
                Err(ConfigError::TooManyOctaves {
                    octaves,
                    max: MAX_OCTAVES
                })
            );
        }
        let at_limit = GenerationParameters {
            algorithm: Algorithm::PerlinNoise,
            octaves: MAX_OCTAVES,
            lacunarity: 1.0,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn rejects_overflowing_lacunarity() {
        let params = GenerationParameters {
            algorithm: Algorithm::PerlinNoise,
            octaves: 32,
            lacunarity: 1.0e20,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonFiniteAccumulation { .. })
        ));
    }

    #[test]
    fn rejects_nan_fields() {
        let params = GenerationParameters {
            height_multiplier: f32::NAN,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::NonFinite {
                field: "height_multiplier"
            })
        );
    }

    #[test]
    fn cache_key_tracks_every_field() {
        let base = GenerationParameters::default();
        assert_eq!(base.cache_key(), base.clone().cache_key());

        let tweaked = GenerationParameters {
            lacunarity: 2.5,
            ..base.clone()
        };
        assert_ne!(base.cache_key(), tweaked.cache_key());

        let corners = GenerationParameters {
            corner_heights: CornerHeights {
                bottom_right: 1.0,
                ..CornerHeights::default()
            },
            ..base.clone()
        };
        assert_ne!(base.cache_key(), corners.cache_key());
    }

    #[test]
    fn ron_round_trip_fills_missing_fields_with_defaults() {
        let params: GenerationParameters =
            ron::from_str("(size: 33, seed: 7, algorithm: PerlinNoise)").expect("parse");
        assert_eq!(params.size, 33);
        assert_eq!(params.seed, 7);
        assert_eq!(params.algorithm, Algorithm::PerlinNoise);
        assert_eq!(params.octaves, 4);
        assert_eq!(params.max_height, 500.0);
    }
}
