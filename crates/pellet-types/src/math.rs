//! Vector types used throughout the simulator.
//!
//! `glam` is the canonical math library for Pellet; every crate goes
//! through these re-exports so the version is pinned in one place.

pub use glam::{UVec3, Vec3};

/// World-space "up". Gravity acts along `-UP`.
pub const UP: Vec3 = Vec3::Y;

/// Converts a `[x, y, z]` config triple into a `Vec3`.
#[inline]
pub fn vec3(a: [f32; 3]) -> Vec3 {
    Vec3::from_array(a)
}
