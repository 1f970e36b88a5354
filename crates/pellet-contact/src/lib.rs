//! # pellet-contact
//!
//! Collision detection and contact response for equal-size spheres.
//!
//! Each sub-step runs two phases:
//! 1. **Broad phase**: a [`BroadPhase`] strategy enumerates candidate
//!    partners per particle: the [`UniformGridBroadPhase`] (27-cell
//!    neighbourhood of a [`UniformGrid`]) or the [`BruteForceBroadPhase`]
//!    (every other particle).
//! 2. **Contact response**: the [`ContactModel`] turns each overlapping
//!    pair, and each wall penetration, into a spring-damper force with a
//!    Coulomb-clamped tangential part.
//!
//! Both strategies share the same contact model, so they are
//! interchangeable at construction time.

pub mod broad;
pub mod brute_force;
pub mod contact;
pub mod grid;
pub mod response;
pub mod uniform_grid;
pub mod walls;

pub use broad::{BroadPhase, BroadPhaseKind, ContactPair, PopulateStats};
pub use brute_force::BruteForceBroadPhase;
pub use contact::Contact;
pub use grid::{GridCell, GridOccupancy, UniformGrid};
pub use response::ContactModel;
pub use uniform_grid::UniformGridBroadPhase;
pub use walls::BoxWalls;
