//! Spring-damper contact response.
//!
//! One force law serves particle pairs and walls. For a body A touching a
//! counterpart B along unit normal `n` (A → B) with penetration `δ` and
//! relative velocity `v_rel = v_B − v_A`:
//!
//! ```text
//! F_n = k·δ − c·(v_rel·n)            normal magnitude, applied as −F_n·n
//! v_t = v_rel − (v_rel·n)·n          tangential slip
//! F_t = min(k_t·|v_t|, μ·|F_n|)      along v_t, dragging A with B
//! ```
//!
//! "Opposing the slip" is read from A's side: A slips relative to B at
//! `v_A − v_B = −v_t`, so a friction force on A along `+v_t` opposes that
//! slip. Applying it along `−v_t` would accelerate the slip and feed
//! energy into every sliding contact.
//!
//! Walls are counterparts of infinite mass and zero velocity. Gravity is
//! added once per particle per sub-step, and the summed force is scaled by
//! the linear force scalar before integration.

use pellet_types::constants::{DEGENERATE_DISTANCE, EPSILON};
use pellet_types::math::UP;
use pellet_types::Vec3;

use crate::contact::Contact;
use crate::walls::BoxWalls;

/// Contact coefficients plus the per-particle body forces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactModel {
    /// Particle radius; two particles touch below `2 * radius`.
    pub radius: f32,
    /// Normal spring stiffness `k`.
    pub spring: f32,
    /// Normal damping `c`.
    pub damping: f32,
    /// Coulomb limit `μ` on the tangential force.
    pub friction: f32,
    /// Tangential viscous coefficient `k_t`.
    pub tangential: f32,
    pub particle_mass: f32,
    /// Gravitational acceleration along `-UP`.
    pub gravity: f32,
    /// Multiplier on the total per-particle force.
    pub linear_force_scalar: f32,
    pub walls: BoxWalls,
}

impl ContactModel {
    pub fn diameter(&self) -> f32 {
        2.0 * self.radius
    }

    /// True if two centres are closer than one diameter.
    pub fn overlaps(&self, a: Vec3, b: Vec3) -> bool {
        a.distance_squared(b) < self.diameter() * self.diameter()
    }

    /// Applies the force law to an established contact.
    pub fn resolve(&self, normal: Vec3, overlap: f32, relative_velocity: Vec3) -> Contact {
        let vn = relative_velocity.dot(normal);
        let normal_force = self.spring * overlap - self.damping * vn;

        let slip = relative_velocity - vn * normal;
        let slip_speed = slip.length();
        let tangential_force = if slip_speed > EPSILON {
            let magnitude = (self.tangential * slip_speed).min(self.friction * normal_force.abs());
            slip * (magnitude / slip_speed)
        } else {
            Vec3::ZERO
        };

        Contact {
            normal,
            overlap,
            normal_force,
            tangential_force,
        }
    }

    /// Contact between particles `i` (A) and `j` (B), if they overlap.
    ///
    /// Coincident centres use a vertical fallback normal whose sign depends
    /// on index order, so the two particles are pushed apart instead of
    /// both being pushed the same way.
    pub fn pair_contact(&self, i: usize, j: usize, positions: &[Vec3], velocities: &[Vec3]) -> Option<Contact> {
        let delta = positions[j] - positions[i];
        let distance = delta.length();
        let overlap = self.diameter() - distance;
        if overlap.is_nan() || overlap <= 0.0 {
            return None;
        }

        let normal = if distance > DEGENERATE_DISTANCE {
            delta / distance
        } else if i < j {
            UP
        } else {
            -UP
        };

        Some(self.resolve(normal, overlap, velocities[j] - velocities[i]))
    }

    /// Force on particle `i` from particle `j` (zero when apart).
    pub fn pair_force(&self, i: usize, j: usize, positions: &[Vec3], velocities: &[Vec3]) -> Vec3 {
        self.pair_contact(i, j, positions, velocities)
            .map_or(Vec3::ZERO, |contact| contact.force_on_a())
    }

    /// Contacts against every wall the particle has crossed.
    pub fn wall_contacts(&self, position: Vec3, velocity: Vec3) -> impl Iterator<Item = Contact> + '_ {
        self.walls
            .penetrations(position)
            .map(move |(normal, depth)| self.resolve(normal, depth, -velocity))
    }

    /// Summed wall force on a particle.
    pub fn wall_force(&self, position: Vec3, velocity: Vec3) -> Vec3 {
        self.wall_contacts(position, velocity)
            .map(|contact| contact.force_on_a())
            .sum()
    }

    /// Weight of one particle.
    pub fn gravity_force(&self) -> Vec3 {
        -self.gravity * self.particle_mass * UP
    }

    /// Forces a particle feels regardless of neighbours: gravity and walls.
    pub fn body_force(&self, position: Vec3, velocity: Vec3) -> Vec3 {
        self.gravity_force() + self.wall_force(position, velocity)
    }

    /// Applies the linear force scalar to an accumulated total.
    #[inline]
    pub fn scale(&self, force: Vec3) -> Vec3 {
        force * self.linear_force_scalar
    }
}
