//! Initial particle placement.
//!
//! Particles are seeded on a shuffled, jittered lattice filling the seed
//! volume. Every site is at least one diameter from its neighbours, so the
//! initial state has no overlapping pairs and the first sub-steps carry no
//! stored spring energy.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use pellet_compute::ParticleBuffer;
use pellet_types::{PelletError, PelletResult, UVec3, Vec3};

/// Per-attempt shrink factor when searching for a lattice spacing.
const SPACING_SHRINK: f32 = 0.99;

/// Half-open region particles are seeded into.
///
/// For a seed extent `e`: x ∈ [0, e/2), y ∈ [-e/2, e/2), z ∈ [0, e/2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl SeedVolume {
    pub fn from_extent(extent: f32) -> Self {
        let half = extent * 0.5;
        Self {
            min: Vec3::new(0.0, -half, 0.0),
            max: Vec3::new(half, half, half),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    /// Lattice sites per axis at `spacing`.
    fn sites(&self, spacing: f32) -> UVec3 {
        let n = (self.size() / spacing).floor();
        UVec3::new(n.x as u32, n.y as u32, n.z as u32)
    }

    /// Largest lattice spacing of at least `diameter` that fits `count`
    /// sites, if any.
    pub fn lattice_spacing(&self, count: usize, diameter: f32) -> Option<f32> {
        let size = self.size();
        let mut spacing = (size.x * size.y * size.z / count.max(1) as f32).cbrt();
        while spacing >= diameter {
            let n = self.sites(spacing);
            if n.x as usize * n.y as usize * n.z as usize >= count {
                return Some(spacing);
            }
            spacing *= SPACING_SHRINK;
        }
        None
    }
}

/// Seeds `count` particles of `diameter` at rest inside `volume`.
///
/// Sites are shuffled and each particle is jittered within its site, so
/// positions are random but no two particles overlap. The same `seed`
/// always yields the same buffer. Fails if `count` non-overlapping
/// particles do not fit in the volume.
pub fn seed_particles(
    count: usize,
    volume: SeedVolume,
    diameter: f32,
    seed: u64,
) -> PelletResult<ParticleBuffer> {
    if count == 0 {
        return Ok(ParticleBuffer::new());
    }
    let spacing = volume.lattice_spacing(count, diameter).ok_or_else(|| {
        PelletError::InvalidConfig(format!(
            "{count} particles of diameter {diameter} do not fit in the seed volume {:?}",
            volume.size()
        ))
    })?;

    let n = volume.sites(spacing);
    let mut sites: Vec<UVec3> = (0..n.z)
        .flat_map(|z| (0..n.y).flat_map(move |y| (0..n.x).map(move |x| UVec3::new(x, y, z))))
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    sites.shuffle(&mut rng);

    let slack = spacing - diameter;
    let mut particles = ParticleBuffer::with_capacity(count);
    for site in sites.into_iter().take(count) {
        let jitter = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * slack;
        let centre = volume.min + (site.as_vec3() + Vec3::splat(0.5)) * spacing;
        particles.push(centre + jitter, Vec3::ZERO);
    }
    Ok(particles)
}
