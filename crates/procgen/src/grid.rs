//! Square height field storage.
//!
//! Heights live in one flat row-major buffer, `index(x, y) = x + y * size`.
//! The world position of a cell is derived on demand from the vertex spacing,
//! so the grid never carries positions that disagree with its heights.

use glam::Vec3;
use rayon::prelude::*;

/// An N x N height field with a fixed vertex spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    spacing: f32,
    heights: Vec<f32>,
}

impl Grid {
    /// Allocate `size * size` cells at height 0 with unit spacing.
    pub fn new(size: usize) -> Self {
        Self::with_spacing(size, 1.0)
    }

    pub fn with_spacing(size: usize, spacing: f32) -> Self {
        Self {
            size,
            spacing,
            heights: vec![0.0; size * size],
        }
    }

    /// Vertices per side.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Flat index of `(x, y)`. Panics outside `[0, size)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.size && y < self.size,
            "grid access ({x}, {y}) outside {0}x{0}",
            self.size
        );
        x + y * self.size
    }

    #[inline]
    pub fn get_height(&self, x: usize, y: usize) -> f32 {
        self.heights[self.index(x, y)]
    }

    #[inline]
    pub fn set_height(&mut self, x: usize, y: usize, height: f32) {
        let i = self.index(x, y);
        self.heights[i] = height;
    }

    /// World position of a cell: `(x * spacing, y * spacing, height)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize) -> Vec3 {
        Vec3::new(
            x as f32 * self.spacing,
            y as f32 * self.spacing,
            self.get_height(x, y),
        )
    }

    /// All heights in row-major order.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub(crate) fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Rows top to bottom, each left to right.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.heights.chunks_exact(self.size.max(1))
    }

    /// Every cell position in row-major order, built one row per task.
    pub fn positions(&self) -> Vec<Vec3> {
        let size = self.size;
        let spacing = self.spacing;
        let mut out = vec![Vec3::ZERO; self.heights.len()];
        if size == 0 {
            return out;
        }
        out.par_chunks_mut(size)
            .zip(self.heights.par_chunks(size))
            .enumerate()
            .for_each(|(y, (row, heights))| {
                for (x, (p, &h)) in row.iter_mut().zip(heights).enumerate() {
                    *p = Vec3::new(x as f32 * spacing, y as f32 * spacing, h);
                }
            });
        out
    }

    /// Lowest and highest height, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.heights.iter().fold(None, |acc, &h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }

    /// Bilinear height at fractional cell coordinates, clamped to the grid.
    pub fn sample(&self, fx: f32, fy: f32) -> f32 {
        let last = self.size.saturating_sub(1);
        if last == 0 {
            return self.heights.first().copied().unwrap_or(0.0);
        }
        let gx = fx.clamp(0.0, last as f32);
        let gy = fy.clamp(0.0, last as f32);
        let x0 = (gx.floor() as usize).min(last - 1);
        let y0 = (gy.floor() as usize).min(last - 1);
        let tx = gx - x0 as f32;
        let ty = gy - y0 as f32;

        let h00 = self.get_height(x0, y0);
        let h10 = self.get_height(x0 + 1, y0);
        let h01 = self.get_height(x0, y0 + 1);
        let h11 = self.get_height(x0 + 1, y0 + 1);

        let top = h00 + (h10 - h00) * tx;
        let bottom = h01 + (h11 - h01) * tx;
        top + (bottom - top) * ty
    }
}
