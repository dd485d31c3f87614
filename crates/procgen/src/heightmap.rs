//! Grayscale heightmap rasters.
//!
//! Heights are stretched linearly from the observed [min, max] to the full
//! sample range of the chosen bit depth.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, ImageFormat, Luma};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BitDepth {
    #[default]
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    /// Largest sample value, `2^bits - 1`.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u8::MAX as u16,
            BitDepth::Sixteen => u16::MAX,
        }
    }
}

/// Single-channel raster, one sample per grid cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightmapImage {
    pub size: u32,
    pub bit_depth: BitDepth,
    /// Samples in `[0, bit_depth.max_value()]`.
    pub samples: Vec<u16>,
    /// Height that maps to sample 0.
    pub min_height: f32,
    /// Height that maps to the maximum sample.
    pub max_height: f32,
}

impl HeightmapImage {
    pub fn sample(&self, x: u32, y: u32) -> u16 {
        self.samples[(x + y * self.size) as usize]
    }

    /// Raw raster bytes, left to right, top to bottom. 16-bit samples are
    /// big-endian, as stored in PNG.
    pub fn to_raster_bytes(&self) -> Vec<u8> {
        match self.bit_depth {
            BitDepth::Eight => self.samples.iter().map(|&s| s as u8).collect(),
            BitDepth::Sixteen => self.samples.iter().flat_map(|s| s.to_be_bytes()).collect(),
        }
    }

    /// Write as a grayscale PNG (8 or 16 bit, matching the image).
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (w, h) = (self.size, self.size);
        match self.bit_depth {
            BitDepth::Eight => {
                let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_fn(w, h, |x, y| {
                    Luma([self.sample(x, y) as u8])
                });
                img.save_with_format(path, ImageFormat::Png)?;
            }
            BitDepth::Sixteen => {
                let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(w, h, |x, y| {
                    Luma([self.sample(x, y)])
                });
                img.save_with_format(path, ImageFormat::Png)?;
            }
        }
        log::info!("Wrote {}x{} {}-bit heightmap to {:?}", w, h, self.bit_depth.bits(), path);
        Ok(())
    }
}

pub struct HeightmapEncoder;

impl HeightmapEncoder {
    /// Normalise every height into the sample range of `bit_depth`.
    ///
    /// A grid whose heights are all equal encodes to a uniform mid-grey.
    pub fn encode(grid: &Grid, bit_depth: BitDepth) -> HeightmapImage {
        let max_value = bit_depth.max_value();
        let (min_height, max_height) = grid.min_max().unwrap_or((0.0, 0.0));
        let span = max_height as f64 - min_height as f64;

        let samples = if span > 0.0 {
            let scale = max_value as f64 / span;
            grid.heights()
                .iter()
                .map(|&h| {
                    ((h as f64 - min_height as f64) * scale)
                        .round()
                        .clamp(0.0, max_value as f64) as u16
                })
                .collect()
        } else {
            let mid = (max_value as u32 + 1) / 2;
            vec![mid as u16; grid.heights().len()]
        };

        HeightmapImage {
            size: grid.size() as u32,
            bit_depth,
            samples,
            min_height,
            max_height,
        }
    }
}

/// Next unused `stem_<n>.ext` in `dir`, one past the highest existing suffix.
/// Creates `dir` if it does not exist.
pub fn next_available_path(dir: impl AsRef<Path>, stem: &str, ext: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let prefix = format!("{stem}_");
    let suffix = format!(".{ext}");
    let mut next = 0u32;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(&suffix))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(n) = index {
            next = next.max(n.saturating_add(1));
        }
    }
    Ok(dir.join(format!("{stem}_{next}.{ext}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("procgen-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn ramp_grid() -> Grid {
        let mut grid = Grid::new(3);
        grid.set_height(0, 0, 0.0);
        grid.set_height(1, 0, 50.0);
        grid.set_height(2, 2, 100.0);
        grid
    }

    #[test]
    fn midpoint_encodes_to_middle_grey() {
        let image = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Eight);
        assert_eq!(image.sample(0, 0), 0);
        assert!((127..=128).contains(&image.sample(1, 0)));
        assert_eq!(image.sample(2, 2), 255);
        assert_eq!(image.min_height, 0.0);
        assert_eq!(image.max_height, 100.0);
    }

    #[test]
    fn sixteen_bit_uses_full_range() {
        let image = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Sixteen);
        assert_eq!(image.sample(0, 0), 0);
        assert_eq!(image.sample(2, 2), u16::MAX);
        assert!((32767..=32768).contains(&image.sample(1, 0)));
    }

    #[test]
    fn flat_grid_encodes_uniformly() {
        let mut grid = Grid::new(5);
        for h in grid.heights_mut() {
            *h = 1000.0;
        }
        let image = HeightmapEncoder::encode(&grid, BitDepth::Eight);
        assert_eq!(image.samples.len(), 25);
        assert!(image.samples.iter().all(|&s| s == image.samples[0]));
        assert_eq!(image.samples[0], 128);
    }

    #[test]
    fn raster_bytes_are_row_major() {
        let image = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Eight);
        let bytes = image.to_raster_bytes();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[8], 255);

        let wide = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Sixteen);
        let bytes = wide.to_raster_bytes();
        assert_eq!(bytes.len(), 18);
        assert_eq!(&bytes[16..], &[0xFF, 0xFF]);
    }

    #[test]
    fn next_available_path_skips_existing_files() {
        let dir = scratch_dir("naming");
        assert_eq!(
            next_available_path(&dir, "T_HeightMap", "png").unwrap(),
            dir.join("T_HeightMap_0.png")
        );
        std::fs::write(dir.join("T_HeightMap_0.png"), b"").unwrap();
        std::fs::write(dir.join("T_HeightMap_4.png"), b"").unwrap();
        std::fs::write(dir.join("T_HeightMap_x.png"), b"").unwrap();
        std::fs::write(dir.join("Other_9.png"), b"").unwrap();
        assert_eq!(
            next_available_path(&dir, "T_HeightMap", "png").unwrap(),
            dir.join("T_HeightMap_5.png")
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn png_round_trip() {
        let dir = scratch_dir("png");
        std::fs::create_dir_all(&dir).unwrap();

        let narrow = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Eight);
        let path = dir.join("eight.png");
        narrow.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_luma8();
        assert_eq!(decoded.dimensions(), (3, 3));
        assert_eq!(decoded.get_pixel(2, 2).0, [255]);
        assert_eq!(decoded.get_pixel(1, 0).0, [narrow.sample(1, 0) as u8]);

        let wide = HeightmapEncoder::encode(&ramp_grid(), BitDepth::Sixteen);
        let path = dir.join("sixteen.png");
        wide.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_luma16();
        assert_eq!(decoded.get_pixel(1, 0).0, [wide.sample(1, 0)]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
