//! ECS components for agents.
//!
//! Agents are entities; all per-frame logic lives in systems that query
//! these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable agent index, dense in `0..agent_count` after every scenario load.
///
/// Marker ownership and occupancy lists refer to agents by this index, and
/// renderers use it to correlate agents with their visuals.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

// ============================================================================
// KINEMATICS
// ============================================================================

/// Agent position. `x` and `z` span the plane; `y` is a constant elevation
/// that integration never touches.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Planar distance to `(x, z)`.
    pub fn planar_distance_to(&self, x: f32, z: f32) -> f32 {
        let dx = x - self.x;
        let dz = z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Planar velocity, recomputed from scratch every frame.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vz: f32,
}

impl Velocity {
    pub fn new(vx: f32, vz: f32) -> Self {
        Self { vx, vz }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vz * self.vz).sqrt()
    }

    /// Rescale to at most `max` while keeping direction.
    pub fn clamped(self, max: f32) -> Self {
        let mag = self.magnitude();
        if mag > max && mag > 0.0 {
            let scale = max / mag;
            Self {
                vx: self.vx * scale,
                vz: self.vz * scale,
            }
        } else {
            self
        }
    }
}

/// Fixed destination assigned at spawn.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Target {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

// ============================================================================
// MARKER OWNERSHIP
// ============================================================================

/// Indices into [`crate::MarkerField`] owned this frame. Empty is valid.
#[derive(Component, Debug, Clone, Default)]
pub struct OwnedMarkers(pub Vec<usize>);

// ============================================================================
// BUNDLES
// ============================================================================

/// Bundle for spawning an agent at rest.
#[derive(Bundle)]
pub struct AgentBundle {
    pub id: AgentId,
    pub position: Position,
    pub velocity: Velocity,
    pub target: Target,
    pub owned: OwnedMarkers,
}

impl AgentBundle {
    pub fn new(id: u32, position: Position, target: Target) -> Self {
        Self {
            id: AgentId(id),
            position,
            velocity: Velocity::default(),
            target,
            owned: OwnedMarkers::default(),
        }
    }
}
