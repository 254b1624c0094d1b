//! JSON export of frame state.
//!
//! Agent snapshots change every step, the marker field only on grid
//! regeneration. A [`FrameExport`] bundles both for hosts that want a single
//! document per frame; markers are omitted when the config hides them.

use crate::world::{MarkerFieldSnapshot, Snapshot};
use serde::{Deserialize, Serialize};

/// Agent snapshot plus, when displayed, the marker field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameExport {
    pub snapshot: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkerFieldSnapshot>,
}

impl FrameExport {
    /// Attach `markers` only if the snapshot asks for them to be displayed.
    pub fn new(snapshot: Snapshot, markers: MarkerFieldSnapshot) -> Self {
        let markers = snapshot.display_markers.then_some(markers);
        Self { snapshot, markers }
    }
}

pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

pub fn snapshot_from_json(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn marker_field_to_json(markers: &MarkerFieldSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(markers)
}

pub fn marker_field_from_json(data: &str) -> Result<MarkerFieldSnapshot, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn frame_to_json(frame: &FrameExport) -> Result<String, serde_json::Error> {
    serde_json::to_string(frame)
}

pub fn frame_from_json(data: &str) -> Result<FrameExport, serde_json::Error> {
    serde_json::from_str(data)
}
