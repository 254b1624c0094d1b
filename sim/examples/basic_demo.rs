//! Basic demonstration of the crowd simulation.
//!
//! Run with: cargo run --example basic_demo
//! Verbose logs: RUST_LOG=crowd_sim=debug cargo run --example basic_demo

use crowd_sim::config::NUM_AGENTS_RANGE;
use crowd_sim::render_bridge::{agents_to_flatbuffer, markers_to_flatbuffer};
use crowd_sim::{Scenario, SimConfig, SimWorld, VelocityPolicyKind};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crowd_sim=info")),
        )
        .init();

    println!("=== Crowd Simulation Demo ===\n");

    for config in [SimConfig::default(), SimConfig::radius_kernel()] {
        let policy = config.velocity_policy;
        let mut sim = SimWorld::with_config(SimConfig {
            rng_seed: Some(42),
            ..config
        })?;
        sim.enable_profiling();

        for scenario in [Scenario::Circle, Scenario::Rows] {
            sim.load_scenario(scenario);
            println!(
                "--- {} scenario, {:?} policy, {} markers ---",
                scenario.name(),
                policy,
                sim.marker_count()
            );
            print_progress(&mut sim);

            // 10 seconds at 20 frames/sec
            for frame in 0..200 {
                sim.step(0.05);
                if (frame + 1) % 50 == 0 {
                    println!("  t={:.1}s", sim.current_time());
                    print_progress(&mut sim);
                }
            }
        }

        if let Some(profiler) = sim.profiler() {
            println!("\n{}", profiler.summary());
        }

        let agents = agents_to_flatbuffer(&sim.snapshot());
        let markers = markers_to_flatbuffer(&sim.marker_snapshot());
        println!(
            "render buffers: {} agent floats, {} marker floats\n",
            agents.len(),
            markers.len()
        );
    }

    let mut sim = SimWorld::with_config(SimConfig {
        num_agents: *NUM_AGENTS_RANGE.start(),
        rng_seed: Some(7),
        ..Default::default()
    })?;
    sim.set_velocity_policy(VelocityPolicyKind::RadiusKernel);
    sim.step(0.05);

    println!("=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty()?);
    Ok(())
}

fn print_progress(sim: &mut SimWorld) {
    let positions = sim.agent_positions();
    let targets = sim.agent_targets();
    let counts = sim.owned_marker_counts();

    let mean_distance = positions
        .iter()
        .zip(&targets)
        .map(|(p, t)| ((p[0] - t[0]).powi(2) + (p[2] - t[2]).powi(2)).sqrt())
        .sum::<f32>()
        / positions.len().max(1) as f32;
    let owned: usize = counts.iter().sum();

    println!(
        "    mean distance to target {:.2}, {} markers owned",
        mean_distance, owned
    );
}
