//! # pellet-solver
//!
//! Time integration and the simulation pipeline.
//!
//! ## Key Types
//!
//! - [`SimulationConfig`]: Every tunable of a run, loadable from TOML
//! - [`Simulation`]: Owns the particles and runs the sub-stepped pipeline
//! - [`Integrator`]: Semi-implicit Euler over the particle buffer
//! - [`TickResult`]: Per-tick timing, grid and energy summary

pub mod config;
pub mod integrator;
pub mod pipeline;
pub mod seed;

pub use config::SimulationConfig;
pub use integrator::Integrator;
pub use pipeline::{Simulation, TickResult};
pub use seed::{seed_particles, SeedVolume};
