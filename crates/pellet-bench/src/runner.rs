//! Benchmark runner: executes scenarios and collects metrics.

use std::time::Instant;

use tracing::info;

use pellet_contact::BroadPhaseKind;
use pellet_solver::{Simulation, SimulationConfig};
use pellet_types::PelletResult;

use crate::metrics::{BenchmarkMetrics, Comparison};
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario from its initial state.
    pub fn run(scenario: &Scenario) -> PelletResult<BenchmarkMetrics> {
        let mut sim = scenario.build()?;
        let initial = sim.particles().positions().to_vec();

        let mut tick_times: Vec<f64> = Vec::with_capacity(scenario.ticks as usize);
        let mut max_wall_violation = sim.max_wall_violation();
        let mut total_dropped = 0u64;
        let mut total_out_of_bounds = 0u64;

        let total_start = Instant::now();
        for _ in 0..scenario.ticks {
            let result = sim.tick(scenario.frame_dt)?;
            tick_times.push(result.wall_time);
            total_dropped += u64::from(result.populate.dropped);
            total_out_of_bounds += u64::from(result.populate.out_of_bounds);
            max_wall_violation = max_wall_violation.max(sim.max_wall_violation());
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let max_displacement = sim
            .particles()
            .positions()
            .iter()
            .zip(&initial)
            .map(|(p, p0)| p.distance(*p0))
            .fold(0.0f32, f32::max);

        let avg_tick = if tick_times.is_empty() {
            0.0
        } else {
            tick_times.iter().sum::<f64>() / tick_times.len() as f64
        };
        let min_tick = tick_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_tick = tick_times.iter().copied().fold(0.0, f64::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            broad_phase: sim.broad_phase().name().to_string(),
            backend: sim.backend().name().to_string(),
            particle_count: sim.particles().len(),
            ticks: scenario.ticks,
            total_wall_time,
            avg_tick_time: avg_tick,
            min_tick_time: if min_tick.is_finite() { min_tick } else { 0.0 },
            max_tick_time: max_tick,
            final_kinetic_energy: sim.kinetic_energy(),
            max_displacement,
            max_wall_violation,
            total_dropped,
            total_out_of_bounds,
        };
        info!(
            scenario = %metrics.scenario,
            broad_phase = %metrics.broad_phase,
            avg_tick_ms = metrics.avg_tick_time * 1000.0,
            "benchmark finished"
        );
        Ok(metrics)
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all() -> PelletResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind)))
            .collect()
    }

    /// Runs `config` once with the grid and once with brute force, from
    /// the same seeded state, checking pair-set agreement every tick.
    pub fn compare(config: &SimulationConfig, ticks: u32, frame_dt: f32) -> PelletResult<Comparison> {
        let mut grid = Simulation::new(SimulationConfig {
            broad_phase: BroadPhaseKind::UniformGrid,
            ..config.clone()
        })?;
        let mut brute = Simulation::new(SimulationConfig {
            broad_phase: BroadPhaseKind::BruteForce,
            ..config.clone()
        })?;

        let mut matching_ticks = 0;
        let mut grid_dropped = 0u64;
        let mut grid_wall_time = 0.0;
        let mut brute_force_wall_time = 0.0;
        let mut grid_pairs = Vec::new();
        let mut brute_force_pairs = Vec::new();

        for _ in 0..ticks {
            let g = grid.tick(frame_dt)?;
            let b = brute.tick(frame_dt)?;
            grid_dropped += u64::from(g.populate.dropped);
            grid_wall_time += g.wall_time;
            brute_force_wall_time += b.wall_time;

            grid_pairs = grid.contact_pairs();
            brute_force_pairs = brute.contact_pairs();
            if grid_pairs == brute_force_pairs {
                matching_ticks += 1;
            }
        }

        let max_position_divergence = grid
            .particles()
            .positions()
            .iter()
            .zip(brute.particles().positions())
            .map(|(a, b)| a.distance(*b))
            .fold(0.0f32, f32::max);

        Ok(Comparison {
            particle_count: config.particle_count,
            ticks,
            matching_ticks,
            grid_pairs: grid_pairs.len(),
            brute_force_pairs: brute_force_pairs.len(),
            max_position_divergence,
            grid_dropped,
            grid_wall_time,
            brute_force_wall_time,
        })
    }
}
