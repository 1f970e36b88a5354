//! CLI command implementations.

use tracing::info;

use pellet_bench::metrics::BenchmarkMetrics;
use pellet_bench::runner::BenchmarkRunner;
use pellet_bench::scenarios::{Scenario, ScenarioKind};
use pellet_contact::BroadPhaseKind;
use pellet_solver::{Simulation, SimulationConfig};
use pellet_telemetry::{EventBus, TracingSink};
use pellet_types::constants::DEFAULT_FRAME_DT;

use crate::Preset;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_config(path: Option<&str>, preset: Preset) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => match preset {
            Preset::Default => SimulationConfig::default(),
            Preset::Debug => SimulationConfig::debug(),
            Preset::Dense => SimulationConfig::dense(),
        },
    };
    config.validate()?;
    Ok(config)
}

/// Run a simulation and report per-tick progress through `tracing`.
pub fn run(
    config_path: Option<&str>,
    preset: Preset,
    ticks: u64,
    dt: f32,
    log_every: u64,
    events: bool,
) -> CliResult {
    let config = load_config(config_path, preset)?;
    println!("Pellet Simulation");
    println!("─────────────────");
    println!("Particles:    {}", config.particle_count);
    println!("Broad phase:  {}", config.broad_phase.name());
    println!("Sub-steps:    {}", config.sub_steps);
    println!("Ticks:        {ticks} @ {dt:.4}s");
    println!();

    let mut sim = Simulation::new(config)?;
    if events {
        sim = sim.with_event_bus(EventBus::new().with_sink(Box::new(TracingSink::default())));
    }

    let log_every = log_every.max(1);
    let mut total_wall_time = 0.0;
    let mut dropped = 0u64;
    for _ in 0..ticks {
        let result = sim.tick(dt)?;
        total_wall_time += result.wall_time;
        dropped += u64::from(result.populate.dropped);
        if (result.tick + 1) % log_every == 0 {
            info!(
                tick = result.tick + 1,
                kinetic = result.kinetic_energy,
                potential = result.potential_energy,
                tick_ms = result.wall_time * 1000.0,
                "progress"
            );
        }
    }
    sim.finish();

    println!("Wall time:    {total_wall_time:.3}s");
    if ticks > 0 {
        println!("Avg tick:     {:.3}ms", total_wall_time * 1000.0 / ticks as f64);
    }
    println!("Final KE:     {:.6e}", sim.kinetic_energy());
    println!("Wall overrun: {:.5}", sim.max_wall_violation());
    println!("Dropped:      {dropped}");
    Ok(())
}

/// Run benchmark suite.
pub fn bench(scenario_name: &str, brute_force: bool, output_path: Option<&str>, json: bool) -> CliResult {
    println!("Pellet Benchmark Suite");
    println!("══════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        match ScenarioKind::from_name(scenario_name) {
            Some(kind) => vec![kind],
            None => {
                let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                return Err(format!(
                    "Unknown scenario: '{scenario_name}'. Available: {}, all",
                    available.join(", ")
                )
                .into());
            }
        }
    };

    let mut all_metrics = Vec::new();
    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind);
        if brute_force {
            scenario = scenario.with_broad_phase(BroadPhaseKind::BruteForce);
        }

        println!(
            "Running: {} ({} particles, {} ticks, {})",
            kind.name(),
            scenario.config.particle_count,
            scenario.ticks,
            scenario.config.broad_phase.name(),
        );
        let metrics = BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg tick:      {:.3}ms", metrics.avg_tick_time * 1000.0);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Wall overrun:  {:.5}", metrics.max_wall_violation);
        println!("  Dropped:       {}", metrics.total_dropped);
        println!();

        all_metrics.push(metrics);
    }

    let report = if json {
        BenchmarkMetrics::to_json(&all_metrics)?
    } else {
        BenchmarkMetrics::to_csv(&all_metrics)
    };
    if let Some(path) = output_path {
        std::fs::write(path, &report)?;
        println!("Results written to: {path}");
    } else {
        println!("{}", report);
    }

    Ok(())
}

/// Compare the grid against brute force on the same seeded state.
pub fn compare(particles: usize, ticks: u32, config_path: Option<&str>) -> CliResult {
    let config = SimulationConfig {
        particle_count: particles,
        ..load_config(config_path, Preset::Default)?
    };
    config.validate()?;

    println!("Pellet Broad-Phase Comparison");
    println!("─────────────────────────────");
    println!("Particles:    {particles}");
    println!("Ticks:        {ticks}");
    println!();

    let comparison = BenchmarkRunner::compare(&config, ticks, DEFAULT_FRAME_DT)?;

    println!("Matching ticks:    {}/{}", comparison.matching_ticks, comparison.ticks);
    println!(
        "Final pairs:       grid {} / brute force {}",
        comparison.grid_pairs, comparison.brute_force_pairs
    );
    println!("Max divergence:    {:.6e}", comparison.max_position_divergence);
    println!("Grid dropped:      {}", comparison.grid_dropped);
    println!(
        "Wall time:         grid {:.3}s / brute force {:.3}s ({:.1}x)",
        comparison.grid_wall_time,
        comparison.brute_force_wall_time,
        comparison.speedup()
    );
    if comparison.is_exact() {
        println!("✅ Strategies agree exactly.");
    } else if comparison.grid_dropped > 0 {
        println!("⚠ Strategies diverged; grid buckets overflowed. Enlarge grid_extent or lower the count.");
    } else {
        println!("⚠ Strategies diverged; particles left the grid. Enlarge grid_extent.");
    }
    Ok(())
}

/// Validate a config file.
pub fn validate(path: &str) -> CliResult {
    println!("Pellet Validator");
    println!("────────────────");
    println!();

    println!("Validating config: {path}");
    let config = SimulationConfig::from_toml_file(path)?;
    println!(
        "✅ Config is valid ({} particles, {}, {} sub-steps).",
        config.particle_count,
        config.broad_phase.name(),
        config.sub_steps
    );
    Ok(())
}
