//! Integration tests for pellet-bench.

use pellet_bench::metrics::{BenchmarkMetrics, Comparison};
use pellet_bench::runner::BenchmarkRunner;
use pellet_bench::scenarios::{Scenario, ScenarioKind};
use pellet_compute::BackendKind;
use pellet_contact::BroadPhaseKind;
use pellet_solver::SimulationConfig;

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 3);
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
        let scenario = Scenario::from_kind(kind);
        assert_eq!(scenario.kind, kind);
        scenario.config.validate().unwrap();
        if let Some(initial) = &scenario.initial {
            assert_eq!(initial.len(), scenario.config.particle_count);
        }
    }
    assert_eq!(ScenarioKind::from_name("cloth"), None);
}

#[test]
fn pair_repulsion_setup() {
    let s = Scenario::pair_repulsion();
    let initial = s.initial.as_ref().unwrap();
    assert_eq!(initial.len(), 2);
    assert!((initial.get(1).position.x - 0.9).abs() < 1e-6);
    assert_eq!(s.config.particle_diameter, 1.0);
    assert_eq!(s.config.gravity_coefficient, 0.0);
}

#[test]
fn overrides_apply() {
    let s = Scenario::box_settle()
        .with_ticks(2)
        .with_broad_phase(BroadPhaseKind::BruteForce)
        .with_backend(BackendKind::Rayon, Some(2));
    assert_eq!(s.ticks, 2);
    assert_eq!(s.config.broad_phase, BroadPhaseKind::BruteForce);
    assert_eq!(s.config.threads, Some(2));
    assert!(s.initial.is_none());
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_pair_repulsion() {
    let metrics = BenchmarkRunner::run(&Scenario::pair_repulsion()).unwrap();

    assert_eq!(metrics.scenario, "pair_repulsion");
    assert_eq!(metrics.broad_phase, "uniform_grid");
    assert_eq!(metrics.backend, "serial");
    assert_eq!(metrics.particle_count, 2);
    assert_eq!(metrics.ticks, 120);
    assert!(metrics.final_kinetic_energy > 0.0);
    assert!(metrics.max_displacement > 0.05);
    assert_eq!(metrics.total_dropped, 0);
    assert!(metrics.min_tick_time <= metrics.avg_tick_time);
    assert!(metrics.avg_tick_time <= metrics.max_tick_time);
}

#[test]
fn run_floor_bounce() {
    let metrics = BenchmarkRunner::run(&Scenario::floor_bounce().with_ticks(30)).unwrap();
    assert_eq!(metrics.particle_count, 1);
    // Half a second of free fall, still above the floor.
    assert!(metrics.max_displacement > 1.0);
    assert!(metrics.max_wall_violation < 0.1);
}

#[test]
fn run_short_box_settle() {
    let scenario = Scenario::box_settle()
        .with_ticks(3)
        .with_backend(BackendKind::Serial, None);
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    assert_eq!(metrics.particle_count, scenario.config.particle_count);
    assert_eq!(metrics.ticks, 3);
    assert!(metrics.total_wall_time > 0.0);
}

#[test]
fn zero_tick_run() {
    let metrics = BenchmarkRunner::run(&Scenario::pair_repulsion().with_ticks(0)).unwrap();
    assert_eq!(metrics.ticks, 0);
    assert_eq!(metrics.avg_tick_time, 0.0);
    assert_eq!(metrics.min_tick_time, 0.0);
    assert_eq!(metrics.max_displacement, 0.0);
}

// ─── Comparison Tests ─────────────────────────────────────────

#[test]
fn grid_matches_brute_force_on_sparse_scene() {
    let config = SimulationConfig {
        particle_count: 200,
        grid_center: [0.0, 5.0, 0.0],
        grid_extent: [6.0, 20.0, 6.0],
        backend: BackendKind::Serial,
        ..Default::default()
    };
    let comparison = BenchmarkRunner::compare(&config, 10, 1.0 / 60.0).unwrap();

    assert_eq!(comparison.particle_count, 200);
    assert_eq!(comparison.grid_dropped, 0);
    assert!(comparison.is_exact(), "{comparison:?}");
    assert_eq!(comparison.grid_pairs, comparison.brute_force_pairs);
}

#[test]
fn speedup_handles_zero_time() {
    let comparison = Comparison {
        particle_count: 0,
        ticks: 0,
        matching_ticks: 0,
        grid_pairs: 0,
        brute_force_pairs: 0,
        max_position_divergence: 0.0,
        grid_dropped: 0,
        grid_wall_time: 0.0,
        brute_force_wall_time: 1.0,
    };
    assert_eq!(comparison.speedup(), 0.0);
    assert!(comparison.is_exact());
}

// ─── Export Tests ─────────────────────────────────────────────

#[test]
fn csv_export() {
    let metrics = BenchmarkRunner::run(&Scenario::pair_repulsion().with_ticks(5)).unwrap();
    let csv = BenchmarkMetrics::to_csv(&[metrics.clone(), metrics]);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    let columns = lines[0].split(',').count();
    assert_eq!(columns, 14);
    assert!(lines[1..].iter().all(|row| row.split(',').count() == columns));
    assert!(lines[1].starts_with("pair_repulsion,uniform_grid,serial,2,5,"));
}

#[test]
fn json_export() {
    let metrics = BenchmarkRunner::run(&Scenario::floor_bounce().with_ticks(2)).unwrap();
    let json = BenchmarkMetrics::to_json(std::slice::from_ref(&metrics)).unwrap();
    let recovered: Vec<BenchmarkMetrics> = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].scenario, "floor_bounce");
    assert_eq!(recovered[0].ticks, 2);
    assert_eq!(recovered[0].particle_count, metrics.particle_count);
}
