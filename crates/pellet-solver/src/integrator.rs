//! Semi-implicit Euler integration.
//!
//! ```text
//! v ← v + (F / m)·dt
//! x ← x + v·dt
//! F ← 0
//! ```
//!
//! Velocity is updated first, so the new position uses the new velocity.

use pellet_compute::{ComputeBackend, Kernel, ParticleBuffer};
use pellet_types::Vec3;

/// Advances particles from their accumulated force, one lane each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    inv_mass: f32,
}

impl Integrator {
    /// `particle_mass` must be positive (checked by config validation).
    pub fn new(particle_mass: f32) -> Self {
        Self {
            inv_mass: 1.0 / particle_mass,
        }
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Integrates one sub-step of length `dt` and clears the forces.
    pub fn step(&self, backend: &dyn ComputeBackend, particles: &mut ParticleBuffer, dt: f32) {
        let inv_mass = self.inv_mass;
        backend.dispatch_particles(Kernel::Integrate, particles, &|_, p| {
            *p.velocity += *p.force * (inv_mass * dt);
            *p.position += *p.velocity * dt;
            *p.force = Vec3::ZERO;
        });
    }
}
