//! Per-frame reset of transient state.

use super::ownership::ActiveMarkers;
use crate::components::{OwnedMarkers, Velocity};
use crate::markers::MarkerField;
use bevy_ecs::prelude::*;

/// Phase A: zero velocities, drop owned-marker lists and marker owners.
pub fn reset_system(
    mut markers: ResMut<MarkerField>,
    mut active: ResMut<ActiveMarkers>,
    mut query: Query<(&mut Velocity, &mut OwnedMarkers)>,
) {
    for (mut vel, mut owned) in query.iter_mut() {
        *vel = Velocity::default();
        owned.0.clear();
    }
    markers.clear_owners();
    active.0.clear();
}
