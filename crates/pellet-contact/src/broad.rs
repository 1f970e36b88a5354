//! Broad phase strategy trait.
//!
//! A broad phase enumerates, for each particle, the other particles it
//! might be touching. Both strategies feed the same [`ContactModel`], so
//! the choice only changes how much work is spent finding partners.

use serde::{Deserialize, Serialize};

use pellet_compute::{ComputeBackend, Kernel, ParticleBuffer};
use pellet_types::{ParticleId, Vec3};

use crate::response::ContactModel;

/// Which broad phase strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseKind {
    /// Uniform grid, 27-cell neighbourhood per particle.
    #[default]
    UniformGrid,
    /// Every particle against every other particle.
    BruteForce,
}

impl BroadPhaseKind {
    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            BroadPhaseKind::UniformGrid => "uniform_grid",
            BroadPhaseKind::BruteForce => "brute_force",
        }
    }
}

/// Outcome of one grid populate pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateStats {
    /// Particles stored in a bucket.
    pub inserted: u32,
    /// Particles whose bucket was already full.
    pub dropped: u32,
    /// Particles outside the grid bounds.
    pub out_of_bounds: u32,
}

impl PopulateStats {
    /// Adds another pass's counts to this one.
    pub fn accumulate(&mut self, other: PopulateStats) {
        self.inserted += other.inserted;
        self.dropped += other.dropped;
        self.out_of_bounds += other.out_of_bounds;
    }

    /// True if every particle ended up in the grid.
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.out_of_bounds == 0
    }
}

/// An overlapping pair, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactPair {
    pub a: ParticleId,
    pub b: ParticleId,
}

/// Trait for broad phase strategies.
///
/// The pipeline calls these methods once per sub-step, in order:
///
/// ```text
/// broad.prepare(backend, particles);            // Clear → Populate (grid only)
/// broad.detect_and_respond(backend, model, particles);
/// ```
///
/// # Implementations
/// - [`UniformGridBroadPhase`](crate::uniform_grid::UniformGridBroadPhase): bounded work per particle
/// - [`BruteForceBroadPhase`](crate::brute_force::BruteForceBroadPhase): O(n²) oracle/fallback
pub trait BroadPhase: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> BroadPhaseKind;

    /// Kernel dispatched for the detect-and-respond stage.
    fn kernel(&self) -> Kernel;

    /// Rebuild any acceleration structure from current positions,
    /// separating its stages with barriers.
    fn prepare(&mut self, backend: &dyn ComputeBackend, particles: &ParticleBuffer) -> PopulateStats;

    /// Calls `visit(j)` for every candidate partner `j != i`, in
    /// ascending index order.
    fn for_each_candidate(&self, i: usize, positions: &[Vec3], visit: &mut dyn FnMut(usize));

    /// Returns the strategy name.
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// Accumulates gravity, wall and pair forces into every particle's
    /// force accumulator, scaled by the linear force scalar.
    ///
    /// Lane `i` only writes `force[i]`; neighbours are read, never written.
    /// Candidates arrive sorted, so the summation order does not depend on
    /// which grid slot a neighbour happened to claim.
    fn detect_and_respond(
        &self,
        backend: &dyn ComputeBackend,
        model: &ContactModel,
        particles: &mut ParticleBuffer,
    ) {
        backend.dispatch_forces(self.kernel(), particles, &|i, positions, velocities| {
            let mut force = model.body_force(positions[i], velocities[i]);
            self.for_each_candidate(i, positions, &mut |j| {
                force += model.pair_force(i, j, positions, velocities);
            });
            model.scale(force)
        });
    }

    /// All overlapping pairs this strategy can see, sorted.
    ///
    /// Requires a prior `prepare` on the same positions.
    fn contact_pairs(&self, model: &ContactModel, positions: &[Vec3]) -> Vec<ContactPair> {
        let mut pairs = Vec::new();
        for i in 0..positions.len() {
            self.for_each_candidate(i, positions, &mut |j| {
                if j > i && model.overlaps(positions[i], positions[j]) {
                    pairs.push(ContactPair {
                        a: ParticleId(i as u32),
                        b: ParticleId(j as u32),
                    });
                }
            });
        }
        pairs.sort_unstable();
        pairs
    }
}
