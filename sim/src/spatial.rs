//! Per-cell occupancy lists for local marker and agent queries.
//!
//! Marker lists are built once per grid generation. Agent lists are cleared
//! and refilled every frame; the per-cell `Vec`s keep their capacity so the
//! refresh does not reallocate in steady state.

use crate::components::{AgentId, Position};
use crate::grid::GridIndex;
use crate::markers::MarkerField;
use bevy_ecs::prelude::*;

/// Membership lists for a single grid cell.
#[derive(Debug, Clone, Default)]
pub struct GridCell {
    /// Indices into [`MarkerField`] of markers generated in this cell.
    pub markers: Vec<usize>,
    /// Indices of agents currently inside this cell.
    pub agents: Vec<u32>,
}

/// Cell membership for markers and agents, indexed by
/// [`GridIndex::cell_index`].
#[derive(Resource, Debug, Default)]
pub struct SpatialOccupancy {
    cells: Vec<GridCell>,
}

impl SpatialOccupancy {
    /// Build occupancy for `grid` with every marker registered in its cell
    /// and no agents.
    pub fn new(grid: &GridIndex, markers: &MarkerField) -> Self {
        let mut cells = vec![GridCell::default(); grid.cell_count()];
        for (index, marker) in markers.iter().enumerate() {
            if let Some(cell) = cells.get_mut(marker.cell) {
                cell.markers.push(index);
            }
        }
        Self { cells }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cell(&self, cell: usize) -> Option<&GridCell> {
        self.cells.get(cell)
    }

    /// Marker indices in the cell with flat index `cell`.
    #[inline]
    pub fn markers_in(&self, cell: usize) -> &[usize] {
        self.cells.get(cell).map(|c| c.markers.as_slice()).unwrap_or(&[])
    }

    /// Agent indices in the cell with flat index `cell`.
    #[inline]
    pub fn agents_in(&self, cell: usize) -> &[u32] {
        self.cells.get(cell).map(|c| c.agents.as_slice()).unwrap_or(&[])
    }

    /// Empty every agent list, keeping capacity.
    pub fn clear_agents(&mut self) {
        for cell in &mut self.cells {
            cell.agents.clear();
        }
    }

    /// Register `agent` in the cell containing `(x, z)`.
    ///
    /// Positions outside the grid are snapped to the nearest edge cell so the
    /// agent is never dropped from occupancy.
    pub fn insert_agent(&mut self, grid: &GridIndex, agent: u32, x: f32, z: f32) {
        let (i, j) = grid.to_cell(x, z);
        let cell = match grid.cell_index(i, j) {
            Some(cell) => cell,
            None => {
                tracing::warn!(agent, x, z, "agent outside grid, snapping to edge cell");
                let (ci, cj) = grid.to_cell_clamped(x, z);
                match grid.cell_index(ci, cj) {
                    Some(cell) => cell,
                    None => return,
                }
            }
        };
        if let Some(entry) = self.cells.get_mut(cell) {
            entry.agents.push(agent);
        }
    }

    /// Total agent entries across all cells.
    pub fn total_agents(&self) -> usize {
        self.cells.iter().map(|c| c.agents.len()).sum()
    }

    /// Total marker entries across all cells.
    pub fn total_markers(&self) -> usize {
        self.cells.iter().map(|c| c.markers.len()).sum()
    }

    /// Every `(cell, agents)` pair with at least one agent (for debugging/visualization).
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, &[u32])> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.agents.is_empty())
            .map(|(i, c)| (i, c.agents.as_slice()))
    }
}

/// System that rebuilds agent occupancy from post-integration positions.
pub fn occupancy_refresh_system(
    grid: Res<GridIndex>,
    mut occupancy: ResMut<SpatialOccupancy>,
    query: Query<(&AgentId, &Position)>,
) {
    occupancy.clear_agents();
    for (id, pos) in query.iter() {
        occupancy.insert_agent(&grid, id.0, pos.x, pos.z);
    }
}
