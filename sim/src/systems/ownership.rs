//! Marker ownership resolution.
//!
//! Each frame every agent scans the cells within its grid radius and claims
//! markers. A marker already claimed moves to the candidate only when the
//! candidate is strictly closer, so on an exact tie the earlier claimant
//! keeps it. Agents are processed in ascending index order, which makes the
//! outcome independent of ECS iteration order.

use crate::components::{AgentId, OwnedMarkers, Position};
use crate::config::SimConfig;
use crate::grid::GridIndex;
use crate::markers::MarkerField;
use crate::spatial::SpatialOccupancy;
use bevy_ecs::prelude::*;

/// Markers claimed by any agent this frame, in first-claim order.
///
/// A marker appears at most once even if its owner changes during the scan.
#[derive(Resource, Debug, Default)]
pub struct ActiveMarkers(pub Vec<usize>);

/// Resolve single-owner claims for one frame.
///
/// `positions[i]` is the planar `[x, z]` of agent `i`, or `None` for an
/// index with no agent. Marker owners must be cleared beforehand; newly
/// claimed markers are appended to `active`.
pub fn resolve_ownership(
    grid: &GridIndex,
    grid_radius: i32,
    occupancy: &SpatialOccupancy,
    markers: &mut MarkerField,
    positions: &[Option<[f32; 2]>],
    active: &mut Vec<usize>,
) {
    for (agent, slot) in positions.iter().enumerate() {
        let Some([x, z]) = *slot else {
            continue;
        };
        let agent = agent as u32;
        let (ci, cj) = grid.to_cell(x, z);

        for cell in grid.neighborhood(ci, cj, grid_radius) {
            for &m in occupancy.markers_in(cell) {
                let Some(marker) = markers.get_mut(m) else {
                    continue;
                };
                match marker.owner {
                    None => {
                        marker.owner = Some(agent);
                        active.push(m);
                    }
                    Some(owner) => {
                        let candidate = marker.distance_sq_to(x, z);
                        let current = positions
                            .get(owner as usize)
                            .copied()
                            .flatten()
                            .map(|[ox, oz]| marker.distance_sq_to(ox, oz))
                            .unwrap_or(f32::INFINITY);
                        if candidate < current {
                            marker.owner = Some(agent);
                        }
                    }
                }
            }
        }
    }
}

/// Phase B: claim markers around every agent.
pub fn ownership_system(
    grid: Res<GridIndex>,
    config: Res<SimConfig>,
    occupancy: Res<SpatialOccupancy>,
    mut markers: ResMut<MarkerField>,
    mut active: ResMut<ActiveMarkers>,
    query: Query<(&AgentId, &Position)>,
    mut positions: Local<Vec<Option<[f32; 2]>>>,
) {
    positions.clear();
    for (id, pos) in query.iter() {
        let index = id.0 as usize;
        if positions.len() <= index {
            positions.resize(index + 1, None);
        }
        positions[index] = Some([pos.x, pos.z]);
    }

    resolve_ownership(
        &grid,
        config.grid_radius(),
        &occupancy,
        &mut markers,
        &positions,
        &mut active.0,
    );

    tracing::trace!(active = active.0.len(), "resolved marker ownership");
}

/// Phase C (first half): hand each activated marker to its final owner.
///
/// Runs after resolution because owners change during the scan.
pub fn assign_owned_markers_system(
    markers: Res<MarkerField>,
    active: Res<ActiveMarkers>,
    mut query: Query<(&AgentId, &mut OwnedMarkers)>,
    mut buckets: Local<Vec<Vec<usize>>>,
) {
    for bucket in buckets.iter_mut() {
        bucket.clear();
    }
    for &m in &active.0 {
        let Some(owner) = markers.get(m).and_then(|marker| marker.owner) else {
            continue;
        };
        let owner = owner as usize;
        if buckets.len() <= owner {
            buckets.resize_with(owner + 1, Vec::new);
        }
        buckets[owner].push(m);
    }

    for (id, mut owned) in query.iter_mut() {
        owned.0.clear();
        if let Some(bucket) = buckets.get(id.0 as usize) {
            owned.0.extend_from_slice(bucket);
        }
    }
}
