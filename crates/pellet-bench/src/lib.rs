//! # pellet-bench
//!
//! Benchmark suite for the Pellet simulator.
//!
//! Provides 3 canonical scenarios, metric collection, a grid versus
//! brute-force comparison, and CSV/JSON export for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::{BenchmarkMetrics, Comparison};
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
