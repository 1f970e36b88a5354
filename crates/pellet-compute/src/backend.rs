//! Compute backend trait and the serial reference backend.
//!
//! The [`ComputeBackend`] trait defines the interface for dispatching
//! data-parallel kernels. A dispatch returns only once every lane has
//! finished; [`ComputeBackend::barrier`] then makes the stage's writes
//! visible to the next dispatch. The [`SerialBackend`] executes lanes in
//! index order and serves as the correctness reference.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::trace;

use pellet_types::{PelletResult, Vec3};

use crate::buffers::{ParticleBuffer, ParticleMut};
use crate::rayon_backend::RayonBackend;

/// The named operations the simulation pipeline dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kernel {
    /// Reset every grid bucket to empty. One lane per cell.
    ClearGrid,
    /// Insert each particle into its grid cell. One lane per particle.
    PopulateGrid,
    /// Accumulate contact, wall and gravity forces using the grid.
    DetectAndRespondGrid,
    /// Accumulate contact, wall and gravity forces scanning all particles.
    DetectAndRespondBruteForce,
    /// Advance velocity/position from the accumulated force.
    Integrate,
}

impl Kernel {
    /// Returns the kernel name.
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::ClearGrid => "ClearGrid",
            Kernel::PopulateGrid => "PopulateGrid",
            Kernel::DetectAndRespondGrid => "DetectAndRespondGrid",
            Kernel::DetectAndRespondBruteForce => "DetectAndRespondBruteForce",
            Kernel::Integrate => "Integrate",
        }
    }
}

/// One entry of a backend's dispatch log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRecord {
    Dispatch { kernel: Kernel, lanes: usize },
    Barrier,
}

/// Lane body computing the force contribution for particle `i` from
/// read-only positions and velocities.
pub type ForceKernel<'a> = dyn Fn(usize, &[Vec3], &[Vec3]) -> Vec3 + Sync + 'a;

/// Lane body with exclusive access to particle `i`.
pub type ParticleKernel<'a> = dyn Fn(usize, ParticleMut<'_>) + Sync + 'a;

/// Trait for data-parallel execution backends.
///
/// Lanes of a single dispatch never alias mutable state: shared
/// structures must be written through atomics, and per-particle slots are
/// only handed to their owning lane.
///
/// # Implementations
/// - [`SerialBackend`]: Sequential reference (always available)
/// - [`RayonBackend`]: Fork-join on a `rayon` thread pool
pub trait ComputeBackend: Send + Sync {
    /// Returns the backend name (e.g., "serial", "rayon").
    fn name(&self) -> &str;

    /// Returns true if lanes may run concurrently.
    fn is_parallel(&self) -> bool;

    /// Runs `body(lane)` for every lane in `0..lanes`.
    fn dispatch(&self, kernel: Kernel, lanes: usize, body: &(dyn Fn(usize) + Sync));

    /// Runs one lane per particle. Lane `i` reads every position and
    /// velocity and its return value is added to `force[i]`.
    fn dispatch_forces(&self, kernel: Kernel, particles: &mut ParticleBuffer, body: &ForceKernel<'_>);

    /// Runs one lane per particle with exclusive access to that particle.
    fn dispatch_particles(
        &self,
        kernel: Kernel,
        particles: &mut ParticleBuffer,
        body: &ParticleKernel<'_>,
    );

    /// Execution barrier between dispatches.
    fn barrier(&self);
}

/// Which backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Serial,
    #[default]
    Rayon,
}

/// Builds a backend of the given kind. `threads` only applies to rayon;
/// `None` uses the global pool.
pub fn create_backend(kind: BackendKind, threads: Option<usize>) -> PelletResult<Box<dyn ComputeBackend>> {
    match kind {
        BackendKind::Serial => Ok(Box::new(SerialBackend::new())),
        BackendKind::Rayon => match threads {
            Some(n) => Ok(Box::new(RayonBackend::with_threads(n)?)),
            None => Ok(Box::new(RayonBackend::new())),
        },
    }
}

/// Serial backend: sequential reference implementation.
///
/// Always available, used for:
/// - Correctness validation (parallel results must match bit for bit)
/// - Pipeline ordering tests via the optional dispatch log
/// - Very small particle counts where threading isn't worthwhile
pub struct SerialBackend {
    log: Option<Mutex<Vec<DispatchRecord>>>,
}

impl SerialBackend {
    /// Creates a new serial backend.
    pub fn new() -> Self {
        Self { log: None }
    }

    /// Creates a serial backend that records every dispatch and barrier.
    pub fn with_dispatch_log() -> Self {
        Self {
            log: Some(Mutex::new(Vec::new())),
        }
    }

    /// Returns the recorded dispatches (empty if logging is off).
    pub fn dispatch_log(&self) -> Vec<DispatchRecord> {
        self.log
            .as_ref()
            .and_then(|log| log.lock().ok().map(|entries| entries.clone()))
            .unwrap_or_default()
    }

    /// Drops all recorded entries.
    pub fn clear_dispatch_log(&self) {
        if let Some(mut entries) = self.log.as_ref().and_then(|log| log.lock().ok()) {
            entries.clear();
        }
    }

    fn record(&self, entry: DispatchRecord) {
        if let Some(mut entries) = self.log.as_ref().and_then(|log| log.lock().ok()) {
            entries.push(entry);
        }
    }
}

impl Default for SerialBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for SerialBackend {
    fn name(&self) -> &str {
        "serial"
    }

    fn is_parallel(&self) -> bool {
        false
    }

    fn dispatch(&self, kernel: Kernel, lanes: usize, body: &(dyn Fn(usize) + Sync)) {
        trace!(kernel = kernel.name(), lanes, "dispatch");
        self.record(DispatchRecord::Dispatch { kernel, lanes });
        for lane in 0..lanes {
            body(lane);
        }
    }

    fn dispatch_forces(&self, kernel: Kernel, particles: &mut ParticleBuffer, body: &ForceKernel<'_>) {
        let lanes = particles.len();
        trace!(kernel = kernel.name(), lanes, "dispatch");
        self.record(DispatchRecord::Dispatch { kernel, lanes });

        let ParticleBuffer {
            position,
            velocity,
            force,
        } = particles;
        let (position, velocity) = (position.as_slice(), velocity.as_slice());
        for (i, f) in force.iter_mut().enumerate() {
            *f += body(i, position, velocity);
        }
    }

    fn dispatch_particles(
        &self,
        kernel: Kernel,
        particles: &mut ParticleBuffer,
        body: &ParticleKernel<'_>,
    ) {
        let lanes = particles.len();
        trace!(kernel = kernel.name(), lanes, "dispatch");
        self.record(DispatchRecord::Dispatch { kernel, lanes });

        let ParticleBuffer {
            position,
            velocity,
            force,
        } = particles;
        let lanes = position.iter_mut().zip(velocity.iter_mut()).zip(force.iter_mut());
        for (i, ((p, v), f)) in lanes.enumerate() {
            body(
                i,
                ParticleMut {
                    position: p,
                    velocity: v,
                    force: f,
                },
            );
        }
    }

    fn barrier(&self) {
        self.record(DispatchRecord::Barrier);
    }
}
