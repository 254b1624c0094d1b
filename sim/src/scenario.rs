//! Initial agent layouts.
//!
//! A scenario is a pure function of the agent count: loading the same
//! scenario twice with the same count yields the same positions and targets.

use crate::components::{Position, Target};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Radius of the circle layout and half-width of the rows layout.
pub const LAYOUT_EXTENT: f32 = 4.5;
/// Elevation of agents in the circle layout.
pub const CIRCLE_ELEVATION: f32 = 0.0;
/// Elevation of agents in the rows layout.
pub const ROWS_ELEVATION: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Scenario {
    /// Agents evenly spaced on a circle, each heading to the opposite point.
    #[default]
    Circle,
    /// Agents alternating between two facing rows, each heading straight
    /// across to the other row.
    Rows,
}

impl Scenario {
    /// Spawn position and target for each agent, by agent index.
    pub fn layout(self, num_agents: u32) -> Vec<(Position, Target)> {
        match self {
            Scenario::Circle => circle_layout(num_agents),
            Scenario::Rows => rows_layout(num_agents),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Circle => "Circle",
            Scenario::Rows => "Rows",
        }
    }
}

fn circle_layout(num_agents: u32) -> Vec<(Position, Target)> {
    let n = num_agents as f32;
    (0..num_agents)
        .map(|i| {
            let theta = TAU * i as f32 / n;
            let opposite = theta + PI;
            let position = Position::new(
                theta.cos() * LAYOUT_EXTENT,
                CIRCLE_ELEVATION,
                theta.sin() * LAYOUT_EXTENT,
            );
            let target = Target::new(
                opposite.cos() * LAYOUT_EXTENT,
                CIRCLE_ELEVATION,
                opposite.sin() * LAYOUT_EXTENT,
            );
            (position, target)
        })
        .collect()
}

fn rows_layout(num_agents: u32) -> Vec<(Position, Target)> {
    let n = num_agents as f32;
    (0..num_agents)
        .map(|i| {
            // Even agents start on the near row, odd agents on the far row.
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            let x = i as f32 / n * 2.0 * LAYOUT_EXTENT - LAYOUT_EXTENT;
            let position = Position::new(x, ROWS_ELEVATION, -side * LAYOUT_EXTENT);
            let target = Target::new(x, ROWS_ELEVATION, side * LAYOUT_EXTENT);
            (position, target)
        })
        .collect()
}
