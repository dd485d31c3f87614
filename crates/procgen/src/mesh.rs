//! Triangle mesh derived from a height grid.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::grid::Grid;

/// Interleaved vertex for renderer upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Mesh data for one terrain section. Independent of the grid once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSection {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangle list, two triangles per grid cell.
    pub indices: Vec<u32>,
    /// Unit normals pointing +Z (up) on flat ground. See [`MeshBuilder::build`]
    /// for how this relates to the index winding.
    pub normals: Option<Vec<Vec3>>,
}

impl MeshSection {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleave positions, normals and UVs. Missing normals become +Z.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(&self.uvs)
            .enumerate()
            .map(|(i, (p, uv))| {
                let n = self
                    .normals
                    .as_ref()
                    .map_or(Vec3::Z, |normals| normals[i]);
                MeshVertex {
                    position: p.to_array(),
                    normal: n.to_array(),
                    uv: uv.to_array(),
                }
            })
            .collect()
    }

    /// Index buffer as raw bytes (native-endian u32).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeshBuilder {
    pub compute_normals: bool,
}

impl MeshBuilder {
    pub fn new(compute_normals: bool) -> Self {
        Self { compute_normals }
    }

    /// Derive the mesh for `grid`.
    ///
    /// Triangles are wound (TopLeft, BottomLeft, TopRight), which is clockwise
    /// seen from +Z. A right-handed cross product
    /// of that winding points -Z, so the normals here are computed with the
    /// opposite operand order and point +Z. This matches a left-handed, Z-up
    /// host where clockwise triangles are front faces; a right-handed renderer
    /// that culls clockwise faces must flip the culling mode or the winding.
    pub fn build(&self, grid: &Grid) -> MeshSection {
        let positions = grid.positions();
        let indices = triangle_indices(grid.size());
        let normals = self
            .compute_normals
            .then(|| vertex_normals(&positions, grid.size()));

        MeshSection {
            positions,
            uvs: uvs(grid.size()),
            indices,
            normals,
        }
    }
}

/// For each cell, (TopLeft, BottomLeft, TopRight) then
/// (TopRight, BottomLeft, BottomRight), rows top to bottom.
fn triangle_indices(size: usize) -> Vec<u32> {
    let cells = size.saturating_sub(1);
    let mut indices = vec![0u32; cells * cells * 6];
    if cells == 0 {
        return indices;
    }

    indices
        .par_chunks_mut(cells * 6)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, quad) in row.chunks_exact_mut(6).enumerate() {
                let top_left = (y * size + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((y + 1) * size + x) as u32;
                let bottom_right = bottom_left + 1;

                quad.copy_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        });
    indices
}

/// `(x / (N - 1), y / (N - 1))` per vertex, row-major.
fn uvs(size: usize) -> Vec<Vec2> {
    let mut out = vec![Vec2::ZERO; size * size];
    if size == 0 {
        return out;
    }
    let denom = size.saturating_sub(1).max(1) as f32;
    out.par_chunks_mut(size).enumerate().for_each(|(y, row)| {
        for (x, uv) in row.iter_mut().enumerate() {
            *uv = Vec2::new(x as f32 / denom, y as f32 / denom);
        }
    });
    out
}

/// Area-weighted face normals accumulated per vertex, facing +Z for flat
/// ground regardless of the clockwise index winding.
fn vertex_normals(positions: &[Vec3], size: usize) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for y in 0..size.saturating_sub(1) {
        for x in 0..size - 1 {
            let i0 = y * size + x;
            let i1 = i0 + 1;
            let i2 = (y + 1) * size + x;
            let i3 = i2 + 1;

            let v0 = positions[i0];
            let v1 = positions[i1];
            let v2 = positions[i2];
            let v3 = positions[i3];

            // First triangle
            let n1 = (v1 - v0).cross(v2 - v0);
            normals[i0] += n1;
            normals[i2] += n1;
            normals[i1] += n1;

            // Second triangle
            let n2 = (v3 - v1).cross(v2 - v1);
            normals[i1] += n2;
            normals[i2] += n2;
            normals[i3] += n2;
        }
    }

    for n in &mut normals {
        *n = n.try_normalize().unwrap_or(Vec3::Z);
    }
    normals
}
