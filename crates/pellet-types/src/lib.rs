//! # pellet-types
//!
//! Shared types, identifiers, error types, and physical constants
//! for the Pellet particle simulator.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other Pellet crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod math;

pub use error::{PelletError, PelletResult};
pub use ids::{CellId, ParticleId};
pub use math::{UVec3, Vec3};
