//! Simulation configuration.
//!
//! `SimConfig` is both the construction input of [`crate::SimWorld`] and an
//! ECS resource read by the per-frame systems. It can be loaded from JSON so
//! hosts can ship tuning presets alongside their scenes.

use crate::error::{SimError, SimResult};
use crate::systems::VelocityPolicyKind;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Slider range hosts expose for the agent count.
pub const NUM_AGENTS_RANGE: RangeInclusive<u32> = 10..=50;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid cells per side of the plane.
    pub grid_resolution: u32,
    /// Inclusive lower bound on markers generated per cell.
    pub min_markers_per_cell: u32,
    /// Inclusive upper bound on markers generated per cell.
    pub max_markers_per_cell: u32,
    /// Influence radius of an agent; also its maximum speed.
    pub agent_radius: f32,
    /// Agents spawned by the next scenario load.
    pub num_agents: u32,
    /// Rendering hint only, carried through snapshots.
    pub display_markers: bool,
    /// How owned markers turn into a velocity.
    pub velocity_policy: VelocityPolicyKind,
    /// Seed for marker jitter. `None` draws one from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 80,
            min_markers_per_cell: 1,
            max_markers_per_cell: 1,
            agent_radius: 0.5,
            num_agents: 20,
            display_markers: true,
            velocity_policy: VelocityPolicyKind::WeightedBlend,
            rng_seed: None,
        }
    }
}

impl SimConfig {
    /// Coarser grid with several markers per cell, steered by the radius kernel.
    pub fn radius_kernel() -> Self {
        Self {
            grid_resolution: 50,
            min_markers_per_cell: 3,
            max_markers_per_cell: 6,
            velocity_policy: VelocityPolicyKind::RadiusKernel,
            ..Default::default()
        }
    }

    /// Reject values that would produce empty grids or undefined indexing.
    pub fn validate(&self) -> SimResult<()> {
        if self.grid_resolution == 0 {
            return Err(SimError::ZeroGridResolution);
        }
        if self.min_markers_per_cell > self.max_markers_per_cell {
            return Err(SimError::MarkerRangeInverted {
                min: self.min_markers_per_cell,
                max: self.max_markers_per_cell,
            });
        }
        if !self.agent_radius.is_finite() || self.agent_radius <= 0.0 {
            return Err(SimError::InvalidAgentRadius(self.agent_radius));
        }
        if self.num_agents == 0 {
            return Err(SimError::ZeroAgents);
        }
        Ok(())
    }

    /// Number of cells an agent's influence spans in each direction, capped
    /// at the grid resolution.
    #[inline]
    pub fn grid_radius(&self) -> i32 {
        let cells = (self.agent_radius * self.grid_resolution as f32 / crate::grid::PLANE_SIZE).round();
        cells.min(self.grid_resolution as f32) as i32
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
