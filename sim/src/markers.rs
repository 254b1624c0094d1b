//! Stationary markers scattered across the grid.
//!
//! Markers never move after generation. Each frame they are claimed by at
//! most one agent; the claim is stored as an agent index, never a handle.

use crate::grid::GridIndex;
use bevy_ecs::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A stationary marker point on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f32,
    pub z: f32,
    /// Flat index of the cell the marker was generated in.
    pub cell: usize,
    /// Index of the agent that owns this marker for the current frame.
    pub owner: Option<u32>,
}

impl Marker {
    pub fn new(x: f32, z: f32, cell: usize) -> Self {
        Self { x, z, cell, owner: None }
    }

    #[inline]
    pub fn distance_sq_to(&self, x: f32, z: f32) -> f32 {
        let dx = self.x - x;
        let dz = self.z - z;
        dx * dx + dz * dz
    }
}

/// Every marker in the simulation, in generation order.
///
/// Per-cell membership lives in [`crate::SpatialOccupancy`], which is built
/// from each marker's `cell`.
#[derive(Resource, Debug, Default)]
pub struct MarkerField {
    markers: Vec<Marker>,
}

impl MarkerField {
    /// Scatter markers over every cell of `grid`.
    ///
    /// Each cell receives a count drawn uniformly from `[min, max]`, and each
    /// marker is offset from the center by a uniform draw on the closed range
    /// of plus or minus half a cell width, on both axes. A marker on a shared
    /// edge still belongs to the cell it was generated in.
    pub fn generate<R: Rng>(grid: &GridIndex, min: u32, max: u32, rng: &mut R) -> Self {
        let res = grid.resolution() as i32;
        let half = grid.half_cell_width();
        let mut markers = Vec::with_capacity(grid.cell_count() * max as usize);

        for i in 0..res {
            for j in 0..res {
                let Some(cell) = grid.cell_index(i, j) else {
                    continue;
                };
                let (cx, cz) = grid.to_center(i, j);
                let count = rng.gen_range(min..=max);
                for _ in 0..count {
                    let x = cx + rng.gen_range(-half..=half);
                    let z = cz + rng.gen_range(-half..=half);
                    markers.push(Marker::new(x, z, cell));
                }
            }
        }

        tracing::info!(
            resolution = grid.resolution(),
            markers = markers.len(),
            "generated marker field"
        );

        Self { markers }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Marker> {
        self.markers.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Drop every ownership tag.
    pub fn clear_owners(&mut self) {
        for marker in &mut self.markers {
            marker.owner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_count_per_cell() {
        let grid = GridIndex::new(12);
        let mut rng = SmallRng::seed_from_u64(7);
        let field = MarkerField::generate(&grid, 3, 3, &mut rng);

        assert_eq!(field.len(), 12 * 12 * 3);
        let mut per_cell = vec![0; grid.cell_count()];
        for marker in field.iter() {
            per_cell[marker.cell] += 1;
        }
        assert!(per_cell.iter().all(|&n| n == 3));
    }

    #[test]
    fn test_markers_stay_inside_their_cell() {
        let grid = GridIndex::new(20);
        let mut rng = SmallRng::seed_from_u64(11);
        let field = MarkerField::generate(&grid, 2, 2, &mut rng);

        for marker in field.iter() {
            let i = (marker.cell / 20) as i32;
            let j = (marker.cell % 20) as i32;
            let ((x0, x1), (z0, z1)) = grid.cell_bounds(i, j);
            assert!(marker.x >= x0 - 1e-5 && marker.x <= x1 + 1e-5);
            assert!(marker.z >= z0 - 1e-5 && marker.z <= z1 + 1e-5);
            assert!(marker.owner.is_none());
        }
    }

    #[test]
    fn test_jitter_spans_closed_half_cell() {
        let grid = GridIndex::new(1);
        let half = grid.half_cell_width();
        let mut rng = SmallRng::seed_from_u64(17);
        let field = MarkerField::generate(&grid, 2000, 2000, &mut rng);

        let max_x = field.iter().map(|m| m.x).fold(f32::MIN, f32::max);
        let min_x = field.iter().map(|m| m.x).fold(f32::MAX, f32::min);
        assert!(max_x <= half && min_x >= -half);
        // Both ends of the interval are reached closely
        assert!(max_x > half * 0.99);
        assert!(min_x < -half * 0.99);
        assert!(field.iter().all(|m| m.cell == 0));
    }

    #[test]
    fn test_count_range_respected() {
        let grid = GridIndex::new(30);
        let mut rng = SmallRng::seed_from_u64(3);
        let field = MarkerField::generate(&grid, 1, 4, &mut rng);

        let mut per_cell = vec![0usize; grid.cell_count()];
        for marker in field.iter() {
            per_cell[marker.cell] += 1;
        }
        let seen_min = per_cell.iter().copied().min().unwrap();
        let seen_max = per_cell.iter().copied().max().unwrap();
        assert!(seen_min >= 1);
        assert!(seen_max <= 4);
        // 900 draws: both extremes show up
        assert_eq!(seen_min, 1);
        assert_eq!(seen_max, 4);
    }

    #[test]
    fn test_zero_markers_allowed() {
        let grid = GridIndex::new(5);
        let mut rng = SmallRng::seed_from_u64(1);
        let field = MarkerField::generate(&grid, 0, 0, &mut rng);
        assert!(field.is_empty());
    }

    #[test]
    fn test_same_seed_same_field() {
        let grid = GridIndex::new(8);
        let a = MarkerField::generate(&grid, 1, 3, &mut SmallRng::seed_from_u64(42));
        let b = MarkerField::generate(&grid, 1, 3, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a.markers, b.markers);
    }

    #[test]
    fn test_clear_owners() {
        let grid = GridIndex::new(2);
        let mut field = MarkerField::generate(&grid, 1, 1, &mut SmallRng::seed_from_u64(5));
        field.get_mut(0).unwrap().owner = Some(3);
        field.get_mut(2).unwrap().owner = Some(0);
        field.clear_owners();
        assert!(field.iter().all(|m| m.owner.is_none()));
    }
}
