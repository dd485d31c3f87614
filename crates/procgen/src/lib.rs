//! Procedural terrain heightmaps: Diamond-Square and layered Perlin noise,
//! plus the triangle mesh and grayscale raster derived from a height grid.

pub mod diamond_square;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod mesh;
pub mod params;
pub mod perlin;
pub mod random;
pub mod terrain;

pub use diamond_square::*;
pub use error::*;
pub use grid::*;
pub use heightmap::*;
pub use mesh::*;
pub use params::*;
pub use perlin::*;
pub use random::*;
pub use terrain::*;
