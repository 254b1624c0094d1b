//! Uniform grid over the simulation plane.
//!
//! The plane is a 10x10 square centered on the origin. Cells are addressed by
//! `(i, j)` where `i` runs along x and `j` along z.

use bevy_ecs::prelude::*;

/// Side length of the simulation plane in world units.
pub const PLANE_SIZE: f32 = 10.0;
/// Half side length; coordinates span `[-HALF_PLANE, HALF_PLANE]`.
pub const HALF_PLANE: f32 = PLANE_SIZE / 2.0;
/// Agents are clamped to `[-AGENT_BOUND, AGENT_BOUND]` on both planar axes.
pub const AGENT_BOUND: f32 = 4.99;

/// Stateless coordinate transform between plane coordinates and grid cells.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndex {
    resolution: u32,
}

impl GridIndex {
    /// Create a grid with `resolution` cells per side. Callers validate
    /// `resolution > 0` through [`crate::SimConfig::validate`].
    pub fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    #[inline]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.resolution as usize * self.resolution as usize
    }

    #[inline]
    pub fn cell_width(&self) -> f32 {
        PLANE_SIZE / self.resolution as f32
    }

    #[inline]
    pub fn half_cell_width(&self) -> f32 {
        self.cell_width() / 2.0
    }

    /// Cell containing the planar point `(x, z)`.
    ///
    /// Out-of-plane inputs produce out-of-range cells; check with
    /// [`GridIndex::contains`] or use [`GridIndex::to_cell_clamped`].
    #[inline]
    pub fn to_cell(&self, x: f32, z: f32) -> (i32, i32) {
        let scale = self.resolution as f32 / PLANE_SIZE;
        (
            ((x + HALF_PLANE) * scale).floor() as i32,
            ((z + HALF_PLANE) * scale).floor() as i32,
        )
    }

    /// Like `to_cell`, but snapped onto the nearest valid cell.
    #[inline]
    pub fn to_cell_clamped(&self, x: f32, z: f32) -> (i32, i32) {
        let (i, j) = self.to_cell(x, z);
        let max = self.resolution as i32 - 1;
        (i.clamp(0, max), j.clamp(0, max))
    }

    /// Centerpoint of cell `(i, j)`.
    #[inline]
    pub fn to_center(&self, i: i32, j: i32) -> (f32, f32) {
        let width = self.cell_width();
        (
            (i as f32 + 0.5) * width - HALF_PLANE,
            (j as f32 + 0.5) * width - HALF_PLANE,
        )
    }

    #[inline]
    pub fn contains(&self, i: i32, j: i32) -> bool {
        let res = self.resolution as i32;
        (0..res).contains(&i) && (0..res).contains(&j)
    }

    /// Flat index of cell `(i, j)`, or `None` when it lies outside the grid.
    #[inline]
    pub fn cell_index(&self, i: i32, j: i32) -> Option<usize> {
        if self.contains(i, j) {
            Some(i as usize * self.resolution as usize + j as usize)
        } else {
            None
        }
    }

    /// Half-open x and z ranges covered by cell `(i, j)`.
    pub fn cell_bounds(&self, i: i32, j: i32) -> ((f32, f32), (f32, f32)) {
        let width = self.cell_width();
        let x0 = i as f32 * width - HALF_PLANE;
        let z0 = j as f32 * width - HALF_PLANE;
        ((x0, x0 + width), (z0, z0 + width))
    }

    /// In-grid cells within `radius` cells of `(ci, cj)` on both axes.
    ///
    /// Offsets that fall outside the grid are skipped rather than clamped or
    /// wrapped. Cells are yielded x-major, matching the ownership scan order.
    /// The walk is bounded by the grid, so huge radii cost at most one pass
    /// over every cell. A negative radius is treated as zero.
    pub fn neighborhood(&self, ci: i32, cj: i32, radius: i32) -> impl Iterator<Item = usize> {
        let res = self.resolution as usize;
        let i_range = self.axis_span(ci, radius);
        let j_range = self.axis_span(cj, radius);
        i_range.flat_map(move |i| j_range.clone().map(move |j| i as usize * res + j as usize))
    }

    /// In-grid indices within `radius` of `c` along one axis; empty when the
    /// whole span lies outside the grid.
    fn axis_span(&self, c: i32, radius: i32) -> std::ops::RangeInclusive<i32> {
        let radius = radius.max(0);
        let max = self.resolution as i32 - 1;
        c.saturating_sub(radius).max(0)..=c.saturating_add(radius).min(max)
    }
}
