//! Public API for the simulation.
//!
//! This module provides the interface a host (renderer, control panel,
//! headless driver) uses to run the simulation.
//!
//! ## Frame
//!
//! `step(dt)` runs one frame: reset, marker ownership, owned-marker
//! assignment, velocity, movement, occupancy refresh. Each phase has its own
//! single-threaded schedule so phases can be profiled individually.
//!
//! ## Scenarios
//!
//! Loading a scenario replaces every agent and rebuilds occupancy before it
//! returns, so the next `step` never sees stale agent indices. The marker
//! field is left as is.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::grid::GridIndex;
use crate::markers::MarkerField;
use crate::profiler::Profiler;
use crate::scenario::Scenario;
use crate::spatial::{occupancy_refresh_system, SpatialOccupancy};
use crate::systems::*;
use crate::world::{MarkerFieldSnapshot, Snapshot};
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// One phase of a frame.
struct Phase {
    name: &'static str,
    schedule: Schedule,
}

impl Phase {
    fn new<M>(name: &'static str, systems: impl IntoSystemConfigs<M>) -> Self {
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(systems);
        Self { name, schedule }
    }
}

fn frame_phases() -> Vec<Phase> {
    vec![
        Phase::new("reset", reset_system),
        Phase::new("ownership", ownership_system),
        Phase::new("assign", assign_owned_markers_system),
        Phase::new("velocity", velocity_system),
        Phase::new("movement", movement_system),
        Phase::new("occupancy", occupancy_refresh_system),
    ]
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Orders `(id, value)` rows by agent id and drops the ids.
fn sorted_by_id<T>(mut rows: Vec<(u32, T)>) -> Vec<T> {
    rows.sort_unstable_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, value)| value).collect()
}

/// The main simulation world container.
///
/// Holds the ECS world and the frame phases, providing a clean API for:
/// - Initializing the simulation
/// - Stepping the simulation forward
/// - Switching scenarios and tuning parameters
/// - Reading agent and marker state for rendering
pub struct SimWorld {
    world: World,
    phases: Vec<Phase>,
    rng: SmallRng,
    scenario: Scenario,
    tick: u64,
    time: f32,
    profiler: Option<Profiler>,
}

impl SimWorld {
    /// Create a world with the default configuration and the circle scenario.
    pub fn new() -> Self {
        Self::build(SimConfig::default())
    }

    /// Create a world with a custom configuration.
    pub fn with_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimConfig) -> Self {
        let mut rng = seeded_rng(config.rng_seed);
        let grid = GridIndex::new(config.grid_resolution);
        let markers = MarkerField::generate(
            &grid,
            config.min_markers_per_cell,
            config.max_markers_per_cell,
            &mut rng,
        );
        let occupancy = SpatialOccupancy::new(&grid, &markers);

        let mut world = World::new();
        world.insert_resource(grid);
        world.insert_resource(markers);
        world.insert_resource(occupancy);
        world.insert_resource(ActiveMarkers::default());
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(ActivePolicy::from_kind(config.velocity_policy));

        tracing::info!(
            grid_resolution = config.grid_resolution,
            agent_radius = config.agent_radius,
            policy = ?config.velocity_policy,
            "created simulation world"
        );
        world.insert_resource(config);

        let mut sim = Self {
            world,
            phases: frame_phases(),
            rng,
            scenario: Scenario::Circle,
            tick: 0,
            time: 0.0,
            profiler: cfg!(feature = "profile").then(Profiler::new),
        };
        sim.load_scenario(Scenario::Circle);
        sim
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    ///
    /// Negative or non-finite `dt` is treated as zero: ownership and
    /// velocities are still recomputed, positions stay put.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "invalid frame delta, stepping with dt = 0");
            0.0
        };
        self.world.resource_mut::<DeltaTime>().0 = dt;

        let Self {
            world,
            phases,
            profiler,
            ..
        } = self;
        for phase in phases.iter_mut() {
            match profiler.as_mut() {
                Some(profiler) => profiler.time_section(phase.name, || phase.schedule.run(world)),
                None => phase.schedule.run(world),
            }
        }
        if let Some(profiler) = profiler.as_mut() {
            profiler.end_frame();
        }

        self.tick += 1;
        self.time += dt;
        tracing::debug!(
            tick = self.tick,
            active_markers = self.world.resource::<ActiveMarkers>().0.len(),
            "stepped"
        );
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    pub fn load_circle_scenario(&mut self) {
        self.load_scenario(Scenario::Circle);
    }

    pub fn load_rows_scenario(&mut self) {
        self.load_scenario(Scenario::Rows);
    }

    /// Replace every agent with a fresh `scenario` layout of
    /// `config().num_agents` agents.
    pub fn load_scenario(&mut self, scenario: Scenario) {
        let mut agents = self.world.query_filtered::<Entity, With<AgentId>>();
        let stale: Vec<Entity> = agents.iter(&self.world).collect();
        for entity in stale {
            self.world.despawn(entity);
        }

        let num_agents = self.config().num_agents;
        for (i, (position, target)) in scenario.layout(num_agents).into_iter().enumerate() {
            self.world.spawn(AgentBundle::new(i as u32, position, target));
        }

        self.world.resource_mut::<MarkerField>().clear_owners();
        self.world.resource_mut::<ActiveMarkers>().0.clear();
        self.refresh_occupancy();
        self.scenario = scenario;

        tracing::info!(scenario = scenario.name(), agents = num_agents, "loaded scenario");
    }

    pub fn current_scenario(&self) -> Scenario {
        self.scenario
    }

    /// Rebuild agent occupancy from current positions.
    fn refresh_occupancy(&mut self) {
        let grid = *self.world.resource::<GridIndex>();
        let mut query = self.world.query::<(&AgentId, &Position)>();
        let agents: Vec<(u32, f32, f32)> = query
            .iter(&self.world)
            .map(|(id, pos)| (id.0, pos.x, pos.z))
            .collect();

        let mut occupancy = self.world.resource_mut::<SpatialOccupancy>();
        occupancy.clear_agents();
        for (id, x, z) in agents {
            occupancy.insert_agent(&grid, id, x, z);
        }
    }

    // ------------------------------------------------------------------
    // Grid
    // ------------------------------------------------------------------

    /// Scatter a fresh marker field over the current grid. Agents keep their
    /// positions.
    pub fn regenerate_grid(&mut self) {
        let config = self.config().clone();
        let grid = GridIndex::new(config.grid_resolution);
        let markers = MarkerField::generate(
            &grid,
            config.min_markers_per_cell,
            config.max_markers_per_cell,
            &mut self.rng,
        );
        let occupancy = SpatialOccupancy::new(&grid, &markers);

        self.world.insert_resource(grid);
        self.world.insert_resource(markers);
        self.world.insert_resource(occupancy);
        self.world.resource_mut::<ActiveMarkers>().0.clear();

        // Velocities came from the old markers.
        let mut agents = self.world.query::<(&mut OwnedMarkers, &mut Velocity)>();
        for (mut owned, mut vel) in agents.iter_mut(&mut self.world) {
            owned.0.clear();
            *vel = Velocity::default();
        }
        self.refresh_occupancy();
    }

    /// Change grid resolution and marker density, then regenerate the grid
    /// and reload the current scenario.
    pub fn reconfigure_grid(
        &mut self,
        grid_resolution: u32,
        min_markers_per_cell: u32,
        max_markers_per_cell: u32,
    ) -> SimResult<()> {
        let config = SimConfig {
            grid_resolution,
            min_markers_per_cell,
            max_markers_per_cell,
            ..self.config().clone()
        };
        config.validate()?;
        self.world.insert_resource(config);
        self.regenerate_grid();
        self.load_scenario(self.scenario);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Runtime parameters
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    /// Set the agent count used by the next scenario load.
    pub fn set_num_agents(&mut self, num_agents: u32) -> SimResult<()> {
        let config = SimConfig {
            num_agents,
            ..self.config().clone()
        };
        config.validate()?;
        self.world.insert_resource(config);
        Ok(())
    }

    pub fn set_velocity_policy(&mut self, kind: VelocityPolicyKind) {
        self.world.resource_mut::<SimConfig>().velocity_policy = kind;
        self.world.insert_resource(ActivePolicy::from_kind(kind));
    }

    pub fn set_display_markers(&mut self, display: bool) {
        self.world.resource_mut::<SimConfig>().display_markers = display;
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn agent_count(&mut self) -> usize {
        let mut query = self.world.query::<&AgentId>();
        query.iter(&self.world).count()
    }

    /// Agent positions `[x, y, z]`, indexed by agent id.
    pub fn agent_positions(&mut self) -> Vec<[f32; 3]> {
        let mut query = self.world.query::<(&AgentId, &Position)>();
        sorted_by_id(query.iter(&self.world).map(|(id, p)| (id.0, p.to_array())).collect())
    }

    /// Agent planar velocities `[vx, vz]`, indexed by agent id.
    pub fn agent_velocities(&mut self) -> Vec<[f32; 2]> {
        let mut query = self.world.query::<(&AgentId, &Velocity)>();
        sorted_by_id(query.iter(&self.world).map(|(id, v)| (id.0, [v.vx, v.vz])).collect())
    }

    /// Agent targets `[x, y, z]`, indexed by agent id.
    pub fn agent_targets(&mut self) -> Vec<[f32; 3]> {
        let mut query = self.world.query::<(&AgentId, &Target)>();
        sorted_by_id(query.iter(&self.world).map(|(id, t)| (id.0, t.to_array())).collect())
    }

    /// Markers owned by each agent during the last step, indexed by agent id.
    pub fn owned_markers(&mut self) -> Vec<Vec<usize>> {
        let mut query = self.world.query::<(&AgentId, &OwnedMarkers)>();
        sorted_by_id(query.iter(&self.world).map(|(id, o)| (id.0, o.0.clone())).collect())
    }

    pub fn owned_marker_counts(&mut self) -> Vec<usize> {
        let mut query = self.world.query::<(&AgentId, &OwnedMarkers)>();
        sorted_by_id(query.iter(&self.world).map(|(id, o)| (id.0, o.0.len())).collect())
    }

    pub fn marker_count(&self) -> usize {
        self.markers().len()
    }

    /// Marker positions `[x, 0, z]` in generation order.
    pub fn marker_positions(&self) -> Vec<[f32; 3]> {
        self.markers().iter().map(|m| [m.x, 0.0, m.z]).collect()
    }

    /// Owner of each marker after the last step.
    pub fn marker_owners(&self) -> Vec<Option<u32>> {
        self.markers().iter().map(|m| m.owner).collect()
    }

    pub fn markers(&self) -> &MarkerField {
        self.world.resource::<MarkerField>()
    }

    pub fn grid(&self) -> GridIndex {
        *self.world.resource::<GridIndex>()
    }

    pub fn occupancy(&self) -> &SpatialOccupancy {
        self.world.resource::<SpatialOccupancy>()
    }

    /// Markers claimed by any agent during the last step.
    pub fn active_markers(&self) -> &[usize] {
        &self.world.resource::<ActiveMarkers>().0
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Get a snapshot of the current agent state.
    pub fn snapshot(&mut self) -> Snapshot {
        let display_markers = self.config().display_markers;
        Snapshot::from_world(&mut self.world, self.tick, self.time, self.scenario, display_markers)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        snapshot_to_json(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn marker_snapshot(&self) -> MarkerFieldSnapshot {
        MarkerFieldSnapshot::from_field(self.markers(), self.grid().resolution())
    }

    pub fn marker_snapshot_json(&self) -> String {
        marker_field_to_json(&self.marker_snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Agent snapshot plus the marker field when `display_markers` is set.
    pub fn frame_export(&mut self) -> FrameExport {
        FrameExport::new(self.snapshot(), self.marker_snapshot())
    }

    pub fn frame_json(&mut self) -> String {
        frame_to_json(&self.frame_export()).unwrap_or_else(|_| "{}".to_string())
    }

    // ------------------------------------------------------------------
    // Profiling
    // ------------------------------------------------------------------

    /// Start timing each phase of every subsequent step.
    pub fn enable_profiling(&mut self) {
        self.profiler.get_or_insert_with(Profiler::new);
    }

    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::grid::AGENT_BOUND;

    fn seeded(config: SimConfig) -> SimWorld {
        SimWorld::with_config(SimConfig {
            rng_seed: Some(1234),
            ..config
        })
        .unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn planar_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
        ((a[0] - b[0]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
    }

    #[test]
    fn test_new_world() {
        let mut sim = SimWorld::new();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.current_scenario(), Scenario::Circle);
        assert_eq!(sim.agent_count(), 20);
        assert_eq!(sim.marker_count(), 80 * 80);
        assert_eq!(sim.occupancy().total_agents(), 20);
        assert_eq!(sim.occupancy().total_markers(), 80 * 80);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let result = SimWorld::with_config(SimConfig {
            grid_resolution: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(SimError::ZeroGridResolution)));

        let result = SimWorld::with_config(SimConfig {
            agent_radius: -0.5,
            ..Default::default()
        });
        assert!(matches!(result, Err(SimError::InvalidAgentRadius(_))));
    }

    #[test]
    fn test_circle_scenario_layout() {
        let mut sim = seeded(SimConfig::default());
        let positions = sim.agent_positions();
        let targets = sim.agent_targets();
        assert_eq!(positions.len(), 20);

        let [x, y, z] = positions[0];
        assert!(close(x, 4.5) && close(y, 0.0) && close(z, 0.0));
        let [tx, ty, tz] = targets[0];
        assert!(close(tx, -4.5) && close(ty, 0.0) && close(tz, 0.0));
    }

    #[test]
    fn test_rows_scenario_layout() {
        let mut sim = seeded(SimConfig::default());
        sim.load_rows_scenario();
        assert_eq!(sim.current_scenario(), Scenario::Rows);

        let [x, y, z] = sim.agent_positions()[0];
        assert!(close(x, -4.5) && close(y, 0.01) && close(z, -4.5));
        let [tx, ty, tz] = sim.agent_targets()[0];
        assert!(close(tx, -4.5) && close(ty, 0.01) && close(tz, 4.5));
        assert_eq!(sim.occupancy().total_agents(), 20);
    }

    #[test]
    fn test_scenario_reload_is_deterministic() {
        let mut sim = seeded(SimConfig::default());
        for _ in 0..10 {
            sim.step(0.05);
        }
        sim.load_circle_scenario();
        let first = sim.agent_positions();
        sim.step(0.05);
        sim.load_circle_scenario();
        let second = sim.agent_positions();

        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
        assert!(sim.agent_velocities().iter().all(|v| *v == [0.0, 0.0]));
        assert!(sim.marker_owners().iter().all(Option::is_none));
    }

    #[test]
    fn test_occupancy_is_exact_partition_after_each_step() {
        let mut sim = seeded(SimConfig::default());
        sim.load_rows_scenario();
        for _ in 0..30 {
            sim.step(0.1);
            let mut ids: Vec<u32> = sim
                .occupancy()
                .occupied_cells()
                .flat_map(|(_, agents)| agents.iter().copied())
                .collect();
            ids.sort_unstable();
            assert_eq!(ids, (0..20).collect::<Vec<u32>>());

            // Each agent sits in the cell its position maps to.
            let grid = sim.grid();
            let positions = sim.agent_positions();
            for (cell, agents) in sim.occupancy().occupied_cells() {
                for &a in agents {
                    let [x, _, z] = positions[a as usize];
                    let (i, j) = grid.to_cell(x, z);
                    assert_eq!(grid.cell_index(i, j), Some(cell));
                }
            }
        }
    }

    #[test]
    fn test_ownership_is_consistent() {
        let mut sim = seeded(SimConfig::default());
        for _ in 0..15 {
            sim.step(0.05);

            let owners = sim.marker_owners();
            assert!(owners.iter().flatten().all(|&o| o < 20));

            // Owned lists partition exactly the activated markers.
            let owned = sim.owned_markers();
            let total: usize = owned.iter().map(Vec::len).sum();
            assert_eq!(total, sim.active_markers().len());
            assert_eq!(total, owners.iter().flatten().count());
            for (agent, list) in owned.iter().enumerate() {
                for &m in list {
                    assert_eq!(owners[m], Some(agent as u32));
                }
            }
        }
    }

    #[test]
    fn test_speed_bounded_by_radius_for_both_policies() {
        for config in [SimConfig::default(), SimConfig::radius_kernel()] {
            let radius = config.agent_radius;
            let mut sim = seeded(config);
            for frame in 0..40 {
                if frame == 20 {
                    sim.load_rows_scenario();
                }
                sim.step(0.05);
                for [vx, vz] in sim.agent_velocities() {
                    assert!((vx * vx + vz * vz).sqrt() <= radius + 1e-5);
                }
            }
        }
    }

    #[test]
    fn test_agents_stay_in_bounds_with_huge_dt() {
        for config in [SimConfig::default(), SimConfig::radius_kernel()] {
            let mut sim = seeded(config);
            sim.load_rows_scenario();
            for _ in 0..20 {
                sim.step(1000.0);
                for [x, _, z] in sim.agent_positions() {
                    assert!((-AGENT_BOUND..=AGENT_BOUND).contains(&x));
                    assert!((-AGENT_BOUND..=AGENT_BOUND).contains(&z));
                }
                assert_eq!(sim.occupancy().total_agents(), 20);
            }
        }
    }

    #[test]
    fn test_zero_dt_recomputes_without_moving() {
        let mut sim = seeded(SimConfig::default());
        let before = sim.agent_positions();
        sim.step(0.0);

        assert_eq!(sim.agent_positions(), before);
        assert!(sim.owned_marker_counts().iter().all(|&n| n > 0));
        assert!(sim
            .agent_velocities()
            .iter()
            .any(|[vx, vz]| *vx != 0.0 || *vz != 0.0));
        assert_eq!(sim.current_tick(), 1);
    }

    #[test]
    fn test_invalid_dt_treated_as_zero() {
        let mut sim = seeded(SimConfig::default());
        let before = sim.agent_positions();
        sim.step(-1.0);
        sim.step(f32::NAN);
        assert_eq!(sim.agent_positions(), before);
        assert_eq!(sim.current_time(), 0.0);
    }

    #[test]
    fn test_agents_make_progress() {
        for config in [SimConfig::default(), SimConfig::radius_kernel()] {
            let mut sim = seeded(config);
            let targets = sim.agent_targets();
            let mean = |positions: &[[f32; 3]]| -> f32 {
                positions
                    .iter()
                    .zip(&targets)
                    .map(|(p, t)| planar_distance(*p, *t))
                    .sum::<f32>()
                    / positions.len() as f32
            };

            let before = mean(sim.agent_positions().as_slice());
            for _ in 0..100 {
                sim.step(0.05);
            }
            let after = mean(sim.agent_positions().as_slice());
            assert!(after < before, "mean distance {} -> {}", before, after);
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = seeded(SimConfig::default());
        let mut b = seeded(SimConfig::default());
        assert_eq!(a.marker_positions(), b.marker_positions());
        for _ in 0..25 {
            a.step(0.05);
            b.step(0.05);
        }
        assert_eq!(a.agent_positions(), b.agent_positions());
    }

    #[test]
    fn test_set_num_agents_applies_on_next_load() {
        let mut sim = seeded(SimConfig::default());
        sim.set_num_agents(35).unwrap();
        assert_eq!(sim.agent_count(), 20);

        sim.load_rows_scenario();
        assert_eq!(sim.agent_count(), 35);
        assert_eq!(sim.occupancy().total_agents(), 35);
        assert_eq!(sim.agent_positions().len(), 35);

        assert!(matches!(sim.set_num_agents(0), Err(SimError::ZeroAgents)));
        assert_eq!(sim.config().num_agents, 35);
    }

    #[test]
    fn test_reconfigure_grid() {
        let mut sim = seeded(SimConfig::default());
        sim.load_rows_scenario();
        sim.reconfigure_grid(20, 2, 2).unwrap();

        assert_eq!(sim.grid().resolution(), 20);
        assert_eq!(sim.marker_count(), 20 * 20 * 2);
        assert_eq!(sim.current_scenario(), Scenario::Rows);
        assert_eq!(sim.occupancy().total_agents(), 20);

        let result = sim.reconfigure_grid(20, 3, 1);
        assert!(matches!(result, Err(SimError::MarkerRangeInverted { .. })));
        assert_eq!(sim.config().min_markers_per_cell, 2);
        sim.step(0.05);
    }

    #[test]
    fn test_regenerate_grid_keeps_agents() {
        let mut sim = seeded(SimConfig::default());
        sim.step(0.05);
        let positions = sim.agent_positions();
        let markers = sim.marker_positions();
        assert!(sim.agent_velocities().iter().any(|v| *v != [0.0, 0.0]));

        sim.regenerate_grid();

        assert_eq!(sim.agent_positions(), positions);
        assert_eq!(sim.marker_count(), markers.len());
        assert_ne!(sim.marker_positions(), markers);
        assert!(sim.owned_marker_counts().iter().all(|&n| n == 0));
        assert!(sim.agent_velocities().iter().all(|v| *v == [0.0, 0.0]));
        assert!(sim.snapshot().agents.iter().all(|a| a.vx == 0.0 && a.vz == 0.0));
        assert_eq!(sim.occupancy().total_agents(), 20);
    }

    #[test]
    fn test_huge_radius_scans_whole_grid() {
        let mut sim = seeded(SimConfig {
            grid_resolution: 10,
            agent_radius: 1.0e9,
            ..Default::default()
        });
        assert_eq!(sim.config().grid_radius(), 10);
        sim.step(0.05);

        // Every agent reaches every cell, so nothing is left unowned.
        assert!(sim.marker_owners().iter().all(Option::is_some));
        assert_eq!(sim.active_markers().len(), 100);
        assert_eq!(sim.occupancy().total_agents(), 20);
    }

    #[test]
    fn test_switch_velocity_policy() {
        let mut sim = seeded(SimConfig::default());
        sim.set_velocity_policy(VelocityPolicyKind::RadiusKernel);
        assert_eq!(sim.config().velocity_policy, VelocityPolicyKind::RadiusKernel);
        sim.step(0.05);
        assert_eq!(sim.world().resource::<ActivePolicy>().0.name(), "RadiusKernel");
    }

    #[test]
    fn test_snapshot() {
        let mut sim = seeded(SimConfig::default());
        sim.set_display_markers(false);
        sim.step(0.05);

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.agents.len(), 20);
        assert!(!snapshot.display_markers);
        for (i, agent) in snapshot.agents.iter().enumerate() {
            assert_eq!(agent.id, i as u32);
        }

        let json = sim.snapshot_json();
        assert!(json.contains("agents"));
        assert!(json.contains("Circle"));

        let markers = sim.marker_snapshot();
        assert_eq!(markers.grid_resolution, 80);
        assert_eq!(markers.markers.len(), sim.marker_count());

        let restored = marker_field_from_json(&sim.marker_snapshot_json()).unwrap();
        assert_eq!(restored.markers, markers.markers);
    }

    #[test]
    fn test_frame_json_follows_display_markers() {
        let mut sim = seeded(SimConfig {
            grid_resolution: 10,
            ..Default::default()
        });
        sim.step(0.05);

        let frame = frame_from_json(&sim.frame_json()).unwrap();
        assert_eq!(frame.snapshot.tick, 1);
        assert_eq!(frame.snapshot.agents.len(), 20);
        let markers = frame.markers.unwrap();
        assert_eq!(markers.markers.len(), 100);
        assert_eq!(
            markers.markers.iter().filter(|m| m.owner.is_some()).count(),
            sim.active_markers().len()
        );

        sim.set_display_markers(false);
        let frame = frame_from_json(&sim.frame_json()).unwrap();
        assert!(frame.markers.is_none());
        assert!(!frame.snapshot.display_markers);
    }

    #[test]
    fn test_profiling_records_each_phase() {
        let mut sim = seeded(SimConfig::default());
        sim.enable_profiling();
        sim.step(0.05);
        sim.step(0.05);

        let profiler = sim.profiler().unwrap();
        assert_eq!(profiler.frame_count(), 2);
        assert_eq!(
            profiler.section_names(),
            &["reset", "ownership", "assign", "velocity", "movement", "occupancy"]
        );
        assert_eq!(profiler.get_section("ownership").unwrap().call_count, 2);
    }
}
