//! Movement system - integrates velocity into position and clamps to bounds.

use crate::components::*;
use crate::grid::AGENT_BOUND;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current frame.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Phase D: `position += velocity * dt` on the plane, then a hard clamp to
/// `[-AGENT_BOUND, AGENT_BOUND]`. Elevation is left untouched.
pub fn movement_system(dt: Res<DeltaTime>, mut query: Query<(&mut Position, &Velocity)>) {
    let delta = dt.0;
    for (mut pos, vel) in query.iter_mut() {
        pos.x = (pos.x + vel.vx * delta).clamp(-AGENT_BOUND, AGENT_BOUND);
        pos.z = (pos.z + vel.vz * delta).clamp(-AGENT_BOUND, AGENT_BOUND);
    }
}
