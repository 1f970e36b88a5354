//! # pellet-compute
//!
//! Data-parallel execution layer for the Pellet simulator.
//!
//! Provides a [`ComputeBackend`] trait with two implementations:
//! - [`SerialBackend`]: Sequential reference (always available, can log dispatches)
//! - [`RayonBackend`]: Fork-join execution on a `rayon` thread pool
//!
//! Every stage of the simulation pipeline is expressed as a named
//! [`Kernel`] dispatched over lanes (one per particle or grid cell), so the
//! same solver code runs unchanged on either backend.

pub mod backend;
pub mod buffers;
pub mod rayon_backend;

pub use backend::{create_backend, BackendKind, ComputeBackend, DispatchRecord, Kernel, SerialBackend};
pub use buffers::{Particle, ParticleBuffer, ParticleMut};
pub use rayon_backend::RayonBackend;
