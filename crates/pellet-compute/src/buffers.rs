//! Particle storage shared by every pipeline stage.
//!
//! Particles are stored structure-of-arrays so that a dispatch lane can
//! hold a mutable reference to its own force slot while reading the
//! position and velocity of every other particle.

use pellet_types::{PelletError, PelletResult, Vec3};

/// A single particle record, produced on demand from the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Force accumulated during the current sub-step.
    pub force: Vec3,
}

/// Exclusive view of one particle, handed to a dispatch lane.
pub struct ParticleMut<'a> {
    pub position: &'a mut Vec3,
    pub velocity: &'a mut Vec3,
    pub force: &'a mut Vec3,
}

/// SoA particle buffer.
///
/// # Layout
///
/// All three channels always have the same length:
/// ```text
/// position: [p0, p1, p2, ...]
/// velocity: [v0, v1, v2, ...]
/// force:    [f0, f1, f2, ...]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffer {
    pub(crate) position: Vec<Vec3>,
    pub(crate) velocity: Vec<Vec3>,
    pub(crate) force: Vec<Vec3>,
}

impl ParticleBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with room for `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            position: Vec::with_capacity(capacity),
            velocity: Vec::with_capacity(capacity),
            force: Vec::with_capacity(capacity),
        }
    }

    /// Creates a buffer of particles at rest.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let n = positions.len();
        Self {
            position: positions,
            velocity: vec![Vec3::ZERO; n],
            force: vec![Vec3::ZERO; n],
        }
    }

    /// Creates a buffer from matching position and velocity arrays.
    pub fn from_states(positions: Vec<Vec3>, velocities: Vec<Vec3>) -> PelletResult<Self> {
        if positions.len() != velocities.len() {
            return Err(PelletError::BufferMismatch {
                expected: positions.len(),
                actual: velocities.len(),
            });
        }
        let n = positions.len();
        Ok(Self {
            position: positions,
            velocity: velocities,
            force: vec![Vec3::ZERO; n],
        })
    }

    /// Appends a particle and returns its index.
    pub fn push(&mut self, position: Vec3, velocity: Vec3) -> usize {
        self.position.push(position);
        self.velocity.push(velocity);
        self.force.push(Vec3::ZERO);
        self.position.len() - 1
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Returns a copy of particle `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn get(&self, i: usize) -> Particle {
        Particle {
            position: self.position[i],
            velocity: self.velocity[i],
            force: self.force[i],
        }
    }

    /// Iterates over all particles by value.
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocity
    }

    pub fn forces(&self) -> &[Vec3] {
        &self.force
    }

    /// Overwrites the position of particle `i`.
    pub fn set_position(&mut self, i: usize, position: Vec3) {
        self.position[i] = position;
    }

    /// Overwrites the velocity of particle `i`.
    pub fn set_velocity(&mut self, i: usize, velocity: Vec3) {
        self.velocity[i] = velocity;
    }

    /// Total kinetic energy: 0.5 * m * Σ ||v_i||².
    pub fn kinetic_energy(&self, particle_mass: f32) -> f64 {
        let sum: f64 = self
            .velocity
            .iter()
            .map(|v| v.length_squared() as f64)
            .sum();
        0.5 * particle_mass as f64 * sum
    }

    /// Gravitational potential energy relative to `floor_y`.
    pub fn potential_energy(&self, particle_mass: f32, gravity: f32, floor_y: f32) -> f64 {
        let sum: f64 = self
            .position
            .iter()
            .map(|p| (p.y - floor_y) as f64)
            .sum();
        particle_mass as f64 * gravity as f64 * sum
    }
}
