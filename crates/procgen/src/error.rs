//! Error types for heightmap generation and export.

use thiserror::Error;

/// Parameters rejected before any generation work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid size {size} is not of the form 2^k + 1 with k in [2, 13]")]
    InvalidSize { size: u32 },

    #[error("size exponent {exponent} is outside [2, 13]")]
    UnsupportedExponent { exponent: u32 },

    #[error("octave count must be positive, got {octaves}")]
    NonPositiveOctaves { octaves: i32 },

    #[error("octave count {octaves} exceeds the limit of {max}")]
    TooManyOctaves { octaves: i32, max: i32 },

    #[error("parameter `{field}` must be finite")]
    NonFinite { field: &'static str },

    #[error("persistence {persistence} / lacunarity {lacunarity} overflow across the requested octaves")]
    NonFiniteAccumulation { persistence: f32, lacunarity: f32 },
}

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("invalid generation parameters: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
