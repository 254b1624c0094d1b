//! Snapshot types.
//!
//! A `Snapshot` is a serializable view of the agents that renderers read
//! after each step. Markers are static after grid generation, so they are
//! exported separately through `MarkerFieldSnapshot`.

use crate::components::*;
use crate::markers::MarkerField;
use crate::scenario::Scenario;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vz: f32,
    pub target_x: f32,
    pub target_z: f32,
    /// Markers owned during the last step.
    pub owned_markers: u32,
}

/// Complete agent state for one frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Steps taken since the world was created.
    pub tick: u64,
    /// Accumulated `dt` in seconds.
    pub time: f32,
    pub scenario: Scenario,
    /// Rendering hint forwarded from the config.
    pub display_markers: bool,
    /// Agents ordered by id.
    pub agents: Vec<AgentSnapshot>,
}

/// Snapshot of a single marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSnapshot {
    pub x: f32,
    pub z: f32,
    pub owner: Option<u32>,
}

/// Every marker, in generation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerFieldSnapshot {
    pub grid_resolution: u32,
    pub markers: Vec<MarkerSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(
        world: &mut World,
        tick: u64,
        time: f32,
        scenario: Scenario,
        display_markers: bool,
    ) -> Self {
        let mut query = world.query::<(&AgentId, &Position, &Velocity, &Target, &OwnedMarkers)>();
        let mut agents: Vec<AgentSnapshot> = query
            .iter(world)
            .map(|(id, pos, vel, target, owned)| AgentSnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                z: pos.z,
                vx: vel.vx,
                vz: vel.vz,
                target_x: target.x,
                target_z: target.z,
                owned_markers: owned.0.len() as u32,
            })
            .collect();
        agents.sort_unstable_by_key(|a| a.id);

        Self {
            tick,
            time,
            scenario,
            display_markers,
            agents,
        }
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl MarkerFieldSnapshot {
    pub fn from_field(field: &MarkerField, grid_resolution: u32) -> Self {
        Self {
            grid_resolution,
            markers: field
                .iter()
                .map(|m| MarkerSnapshot {
                    x: m.x,
                    z: m.z,
                    owner: m.owner,
                })
                .collect(),
        }
    }
}
