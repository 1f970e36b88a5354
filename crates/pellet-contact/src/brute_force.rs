//! No-partition broad phase.
//!
//! Every particle is a candidate for every other one. O(n²) per sub-step,
//! kept as the correctness oracle for the grid and as the fallback for
//! tiny particle counts.

use pellet_compute::{ComputeBackend, Kernel, ParticleBuffer};
use pellet_types::Vec3;

use crate::broad::{BroadPhase, BroadPhaseKind, PopulateStats};

/// Scans all particles; needs no acceleration structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceBroadPhase;

impl BruteForceBroadPhase {
    pub fn new() -> Self {
        Self
    }
}

impl BroadPhase for BruteForceBroadPhase {
    fn kind(&self) -> BroadPhaseKind {
        BroadPhaseKind::BruteForce
    }

    fn kernel(&self) -> Kernel {
        Kernel::DetectAndRespondBruteForce
    }

    fn prepare(&mut self, _backend: &dyn ComputeBackend, _particles: &ParticleBuffer) -> PopulateStats {
        PopulateStats::default()
    }

    fn for_each_candidate(&self, i: usize, positions: &[Vec3], visit: &mut dyn FnMut(usize)) {
        for j in (0..positions.len()).filter(|&j| j != i) {
            visit(j);
        }
    }
}
