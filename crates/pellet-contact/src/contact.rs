//! Contact record produced by the response model.

use pellet_types::Vec3;

/// A resolved contact between body A and a counterpart B (another
/// particle or a wall).
///
/// Carries everything needed to explain the force on A: the geometry of
/// the overlap and the split into normal and tangential parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from A toward B.
    pub normal: Vec3,
    /// Penetration depth (always positive for a contact).
    pub overlap: f32,
    /// Signed normal force magnitude `k·overlap − c·(v_rel·n)`.
    /// Positive pushes the bodies apart.
    pub normal_force: f32,
    /// Friction force on A, perpendicular to `normal`.
    pub tangential_force: Vec3,
}

impl Contact {
    /// Total force applied to A.
    pub fn force_on_a(&self) -> Vec3 {
        -self.normal_force * self.normal + self.tangential_force
    }

    /// True while the normal force pushes the bodies apart.
    pub fn is_repulsive(&self) -> bool {
        self.normal_force > 0.0
    }
}
