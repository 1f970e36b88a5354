//! Box walls.
//!
//! The container is open at the top: four vertical side walls at
//! `±(box_size - radius)` on X and Z, and a floor at `-box_size + radius`.
//! Limits are expressed for particle centres, so a particle touches a wall
//! when its centre crosses the limit.

use pellet_types::Vec3;

/// Centre-space limits of the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxWalls {
    /// Centres must satisfy `|x| <= limit_xz` and `|z| <= limit_xz`.
    pub limit_xz: f32,
    /// Centres must satisfy `y >= floor_y`.
    pub floor_y: f32,
}

impl BoxWalls {
    /// Walls of a box spanning `[-box_size, box_size]` horizontally with
    /// its floor at `-box_size`, for particles of the given radius.
    pub fn new(box_size: f32, radius: f32) -> Self {
        Self {
            limit_xz: box_size - radius,
            floor_y: -box_size + radius,
        }
    }

    /// Faces the centre has crossed, as `(outward normal, depth)`.
    ///
    /// The normal points from the particle toward the wall, matching the
    /// `A → B` convention of a particle pair.
    pub fn penetrations(&self, position: Vec3) -> impl Iterator<Item = (Vec3, f32)> {
        let l = self.limit_xz;
        [
            (Vec3::X, position.x - l),
            (Vec3::NEG_X, -l - position.x),
            (Vec3::Z, position.z - l),
            (Vec3::NEG_Z, -l - position.z),
            (Vec3::NEG_Y, self.floor_y - position.y),
        ]
        .into_iter()
        .filter(|&(_, depth)| depth > 0.0)
    }

    /// How far `position` lies outside the walls (0 if inside).
    pub fn violation(&self, position: Vec3) -> f32 {
        self.penetrations(position)
            .map(|(_, depth)| depth)
            .fold(0.0, f32::max)
    }

    pub fn contains(&self, position: Vec3) -> bool {
        self.violation(position) == 0.0
    }
}
