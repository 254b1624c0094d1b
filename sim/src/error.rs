//! Error types for configuring the simulation.
//!
//! Stepping never fails; only configuration can be rejected.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("grid resolution must be at least 1 cell per side")]
    ZeroGridResolution,

    #[error("marker range inverted: min {min} > max {max}")]
    MarkerRangeInverted { min: u32, max: u32 },

    #[error("agent radius must be a positive finite number, got {0}")]
    InvalidAgentRadius(f32),

    #[error("agent count must be at least 1")]
    ZeroAgents,

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
