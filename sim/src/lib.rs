//! Crowd Simulation Core
//!
//! A marker-based crowd simulation on a square plane. Agents claim nearby
//! markers each frame (a marker belongs to its closest claimant) and the
//! markers an agent owns steer it toward its target.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod grid;
pub mod markers;
pub mod profiler;
pub mod render_bridge;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use grid::GridIndex;
pub use markers::{Marker, MarkerField};
pub use scenario::Scenario;
pub use spatial::{GridCell, SpatialOccupancy};
pub use systems::*;
pub use world::{AgentSnapshot, MarkerFieldSnapshot, MarkerSnapshot, Snapshot};
