//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

use pellet_types::{PelletError, PelletResult};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    pub broad_phase: String,
    pub backend: String,
    pub particle_count: usize,
    /// Number of ticks executed.
    pub ticks: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per tick (seconds).
    pub avg_tick_time: f64,
    pub min_tick_time: f64,
    pub max_tick_time: f64,
    /// Final kinetic energy (should approach zero for a settled box).
    pub final_kinetic_energy: f64,
    /// Largest particle displacement from its initial position.
    pub max_displacement: f32,
    /// Worst wall violation seen at the end of any tick.
    pub max_wall_violation: f32,
    /// Grid insertions dropped by full buckets, over the whole run.
    pub total_dropped: u64,
    /// Grid insertions skipped for out-of-grid particles, over the whole run.
    pub total_out_of_bounds: u64,
}

impl BenchmarkMetrics {
    /// CSV header matching [`to_csv_row`](Self::to_csv_row).
    pub fn to_csv_header() -> String {
        "scenario,broad_phase,backend,particles,ticks,total_wall_time_s,avg_tick_ms,min_tick_ms,max_tick_ms,final_ke,max_displacement,max_wall_violation,dropped,out_of_bounds".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6},{:.6},{},{}",
            self.scenario,
            self.broad_phase,
            self.backend,
            self.particle_count,
            self.ticks,
            self.total_wall_time,
            self.avg_tick_time * 1000.0,
            self.min_tick_time * 1000.0,
            self.max_tick_time * 1000.0,
            self.final_kinetic_energy,
            self.max_displacement,
            self.max_wall_violation,
            self.total_dropped,
            self.total_out_of_bounds,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Pretty-printed JSON array.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> PelletResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| PelletError::Serialization(e.to_string()))
    }
}

/// Outcome of running the grid and brute-force strategies side by side
/// from the same initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub particle_count: usize,
    pub ticks: u32,
    /// Ticks at which both strategies saw the same overlapping pairs.
    pub matching_ticks: u32,
    /// Overlapping pairs at the end, per strategy.
    pub grid_pairs: usize,
    pub brute_force_pairs: usize,
    /// Largest distance between corresponding particles at the end.
    pub max_position_divergence: f32,
    /// Grid insertions dropped over the run. Non-zero explains divergence.
    pub grid_dropped: u64,
    pub grid_wall_time: f64,
    pub brute_force_wall_time: f64,
}

impl Comparison {
    /// True when every tick agreed and the final states are identical.
    pub fn is_exact(&self) -> bool {
        self.matching_ticks == self.ticks && self.max_position_divergence == 0.0
    }

    /// Brute-force time over grid time.
    pub fn speedup(&self) -> f64 {
        if self.grid_wall_time > 0.0 {
            self.brute_force_wall_time / self.grid_wall_time
        } else {
            0.0
        }
    }
}
