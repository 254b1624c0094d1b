//! Velocity policies: turning an agent's owned markers into a velocity.
//!
//! Two policies are available behind the [`VelocityPolicy`] trait. Both
//! return exactly zero when the agent owns no markers, and both cap the
//! result at the agent radius by rescaling, never per component.
//!
//! - [`WeightedBlend`] (default): weight-normalized average of marker
//!   displacements, favoring close markers that point toward the target.
//! - [`RadiusKernel`]: additive sum of unit marker directions scaled by a
//!   radial falloff and an alignment term, ignoring markers farther away
//!   than the target.

use crate::components::{OwnedMarkers, Position, Target, Velocity};
use crate::config::SimConfig;
use crate::markers::MarkerField;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Agents closer than this to their target stop under [`WeightedBlend`].
pub const ARRIVAL_EPSILON: f32 = 0.01;
/// Per-marker gain of [`RadiusKernel`].
pub const KERNEL_GAIN: f32 = 0.2;

/// Strategy for computing an agent's velocity from the markers it owns.
///
/// `position`, `target` and `markers` are planar `[x, z]` coordinates.
pub trait VelocityPolicy: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn velocity(
        &self,
        position: [f32; 2],
        target: [f32; 2],
        markers: &[[f32; 2]],
        agent_radius: f32,
    ) -> Velocity;
}

/// Serializable selector for the built-in policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VelocityPolicyKind {
    #[default]
    WeightedBlend,
    RadiusKernel,
}

impl VelocityPolicyKind {
    pub fn into_policy(self) -> Box<dyn VelocityPolicy> {
        match self {
            VelocityPolicyKind::WeightedBlend => Box::new(WeightedBlend),
            VelocityPolicyKind::RadiusKernel => Box::new(RadiusKernel),
        }
    }
}

/// Resource holding the policy used by [`velocity_system`].
#[derive(Resource)]
pub struct ActivePolicy(pub Box<dyn VelocityPolicy>);

impl ActivePolicy {
    pub fn from_kind(kind: VelocityPolicyKind) -> Self {
        Self(kind.into_policy())
    }
}

#[inline]
fn length(v: [f32; 2]) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

#[inline]
fn sub(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// Cosine of the angle between `a` and `b`; zero if either is degenerate.
#[inline]
fn cos_between(a: [f32; 2], a_len: f32, b: [f32; 2], b_len: f32) -> f32 {
    if a_len > 0.0 && b_len > 0.0 {
        (a[0] * b[0] + a[1] * b[1]) / (a_len * b_len)
    } else {
        0.0
    }
}

// ============================================================================
// WEIGHTED BLEND
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedBlend;

impl WeightedBlend {
    /// `1 / (1 + |d|) * (1 + cos(d, to_target))`
    #[inline]
    fn weight(displacement: [f32; 2], to_target: [f32; 2], to_target_len: f32) -> f32 {
        let len = length(displacement);
        let falloff = 1.0 / (1.0 + len);
        falloff * (1.0 + cos_between(displacement, len, to_target, to_target_len))
    }
}

impl VelocityPolicy for WeightedBlend {
    fn name(&self) -> &'static str {
        "WeightedBlend"
    }

    fn velocity(
        &self,
        position: [f32; 2],
        target: [f32; 2],
        markers: &[[f32; 2]],
        agent_radius: f32,
    ) -> Velocity {
        if markers.is_empty() {
            return Velocity::default();
        }
        let to_target = sub(target, position);
        let to_target_len = length(to_target);
        if to_target_len <= ARRIVAL_EPSILON {
            return Velocity::default();
        }

        let total: f32 = markers
            .iter()
            .map(|&m| Self::weight(sub(m, position), to_target, to_target_len))
            .sum();
        if total <= 0.0 || !total.is_finite() {
            return Velocity::default();
        }

        let mut v = Velocity::default();
        for &m in markers {
            let d = sub(m, position);
            let w = Self::weight(d, to_target, to_target_len) / total;
            v.vx += d[0] * w;
            v.vz += d[1] * w;
        }
        v.clamped(agent_radius)
    }
}

// ============================================================================
// RADIUS KERNEL
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct RadiusKernel;

impl VelocityPolicy for RadiusKernel {
    fn name(&self) -> &'static str {
        "RadiusKernel"
    }

    fn velocity(
        &self,
        position: [f32; 2],
        target: [f32; 2],
        markers: &[[f32; 2]],
        agent_radius: f32,
    ) -> Velocity {
        let radius_sq = agent_radius * agent_radius;
        let to_target = sub(target, position);
        let to_target_len = length(to_target);

        let mut v = Velocity::default();
        for &m in markers {
            let to_marker = sub(m, position);
            let dist_sq = to_marker[0] * to_marker[0] + to_marker[1] * to_marker[1];
            let dist = dist_sq.sqrt();
            // Markers past the target do not help progress.
            if to_target_len < dist || dist == 0.0 {
                continue;
            }
            let alignment = 2.0 * cos_between(to_target, to_target_len, to_marker, dist) + 1.0;
            let falloff = ((radius_sq - dist_sq) / radius_sq).max(0.0);
            let gain = KERNEL_GAIN * falloff * alignment / dist;
            v.vx += to_marker[0] * gain;
            v.vz += to_marker[1] * gain;
        }
        v.clamped(agent_radius)
    }
}

// ============================================================================
// SYSTEM
// ============================================================================

/// Phase C: compute each agent's velocity from the markers it owns.
pub fn velocity_system(
    config: Res<SimConfig>,
    policy: Res<ActivePolicy>,
    markers: Res<MarkerField>,
    mut query: Query<(&Position, &Target, &OwnedMarkers, &mut Velocity)>,
    mut scratch: Local<Vec<[f32; 2]>>,
) {
    let radius = config.agent_radius;
    for (pos, target, owned, mut vel) in query.iter_mut() {
        scratch.clear();
        scratch.extend(
            owned
                .0
                .iter()
                .filter_map(|&m| markers.get(m))
                .map(|m| [m.x, m.z]),
        );
        if scratch.is_empty() {
            *vel = Velocity::default();
            continue;
        }
        *vel = policy
            .0
            .velocity([pos.x, pos.z], [target.x, target.z], &scratch, radius)
            .clamped(radius);
    }
}
