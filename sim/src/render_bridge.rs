//! Render Bridge
//!
//! Converts snapshots into flat `f32` buffers a renderer can consume without
//! parsing JSON: one buffer for agents, one for markers.
//!
//! # Agent Buffer Layout
//!
//! ```text
//! [0]  agent_count (as f32)
//! For each agent i (offset = 1 + i * AGENT_STRIDE):
//!   [+0] id             - Agent index (u32 as f32)
//!   [+1] x              - X position
//!   [+2] y              - Elevation
//!   [+3] z              - Z position
//!   [+4] vx             - X velocity (units/sec)
//!   [+5] vz             - Z velocity (units/sec)
//!   [+6] target_x       - Target X
//!   [+7] target_z       - Target Z
//!   [+8] owned_markers  - Markers owned last step (count as f32)
//! ```
//!
//! # Marker Buffer Layout
//!
//! ```text
//! [0]  marker_count (as f32)
//! For each marker i (offset = 1 + i * MARKER_STRIDE):
//!   [+0] x
//!   [+1] z
//!   [+2] owner          - Owning agent index, or -1.0 when unowned
//! ```
//!
//! Both buffers are deterministic: the same snapshot always produces the
//! same buffer. Agents are written in id order, markers in generation order.

use crate::world::{MarkerFieldSnapshot, Snapshot};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of f32 values per agent in the agent buffer.
///
/// **Part of the renderer contract. Do not change without versioning.**
pub const AGENT_STRIDE: usize = 9;

/// Number of f32 values per marker in the marker buffer.
pub const MARKER_STRIDE: usize = 3;

/// Number of f32 values in each buffer header (the element count).
pub const HEADER_SIZE: usize = 1;

/// Owner value written for unowned markers.
pub const NO_OWNER: f32 = -1.0;

/// Offset within agent data for: ID
pub const FIELD_ID: usize = 0;
/// Offset within agent data for: X position
pub const FIELD_X: usize = 1;
/// Offset within agent data for: Elevation
pub const FIELD_Y: usize = 2;
/// Offset within agent data for: Z position
pub const FIELD_Z: usize = 3;
/// Offset within agent data for: X velocity
pub const FIELD_VX: usize = 4;
/// Offset within agent data for: Z velocity
pub const FIELD_VZ: usize = 5;
/// Offset within agent data for: Target X
pub const FIELD_TARGET_X: usize = 6;
/// Offset within agent data for: Target Z
pub const FIELD_TARGET_Z: usize = 7;
/// Offset within agent data for: Owned marker count
pub const FIELD_OWNED_MARKERS: usize = 8;

pub const MARKER_FIELD_X: usize = 0;
pub const MARKER_FIELD_Z: usize = 1;
pub const MARKER_FIELD_OWNER: usize = 2;

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Convert a snapshot's agents to the flat agent buffer.
///
/// ```rust
/// use crowd_sim::api::SimWorld;
/// use crowd_sim::render_bridge::{agents_to_flatbuffer, AGENT_STRIDE, HEADER_SIZE};
///
/// let mut sim = SimWorld::new();
/// let buffer = agents_to_flatbuffer(&sim.snapshot());
///
/// let count = buffer[0] as usize;
/// assert_eq!(buffer.len(), HEADER_SIZE + count * AGENT_STRIDE);
/// ```
pub fn agents_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.agents.len();
    let mut buffer = Vec::with_capacity(calculate_agent_buffer_size(count));
    buffer.push(count as f32);

    for agent in &snapshot.agents {
        buffer.extend_from_slice(&[
            agent.id as f32,
            agent.x,
            agent.y,
            agent.z,
            agent.vx,
            agent.vz,
            agent.target_x,
            agent.target_z,
            agent.owned_markers as f32,
        ]);
    }

    debug_assert_eq!(buffer.len(), calculate_agent_buffer_size(count));
    buffer
}

/// Convert a marker field snapshot to the flat marker buffer.
pub fn markers_to_flatbuffer(snapshot: &MarkerFieldSnapshot) -> Vec<f32> {
    let count = snapshot.markers.len();
    let mut buffer = Vec::with_capacity(calculate_marker_buffer_size(count));
    buffer.push(count as f32);

    for marker in &snapshot.markers {
        let owner = marker.owner.map_or(NO_OWNER, |o| o as f32);
        buffer.extend_from_slice(&[marker.x, marker.z, owner]);
    }

    debug_assert_eq!(buffer.len(), calculate_marker_buffer_size(count));
    buffer
}

// ============================================================================
// HELPERS
// ============================================================================

#[inline]
pub fn calculate_agent_buffer_size(agent_count: usize) -> usize {
    HEADER_SIZE + agent_count * AGENT_STRIDE
}

#[inline]
pub fn calculate_marker_buffer_size(marker_count: usize) -> usize {
    HEADER_SIZE + marker_count * MARKER_STRIDE
}

/// Parse the element count from either buffer.
///
/// Returns `None` if the buffer is empty.
#[inline]
pub fn parse_count(buffer: &[f32]) -> Option<usize> {
    buffer.first().map(|&count| count as usize)
}

#[inline]
pub const fn agent_offset(agent_index: usize) -> usize {
    HEADER_SIZE + agent_index * AGENT_STRIDE
}

#[inline]
pub const fn marker_offset(marker_index: usize) -> usize {
    HEADER_SIZE + marker_index * MARKER_STRIDE
}
