//! Fork-join backend on a `rayon` thread pool.

use std::sync::atomic::{fence, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use pellet_types::{PelletError, PelletResult};

use crate::backend::{ComputeBackend, ForceKernel, Kernel, ParticleKernel};
use crate::buffers::{ParticleBuffer, ParticleMut};

/// Runs every dispatch as a `rayon` parallel-for.
///
/// `par_iter` joins all lanes before returning, so each dispatch already
/// ends in a join; `barrier()` adds a sequentially-consistent fence on
/// top so writes made through atomics are ordered before the next stage.
pub struct RayonBackend {
    /// Dedicated pool, or `None` to run on rayon's global pool.
    pool: Option<ThreadPool>,
}

impl RayonBackend {
    /// Creates a backend on the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Creates a backend on a dedicated pool with `threads` workers.
    pub fn with_threads(threads: usize) -> PelletResult<Self> {
        if threads == 0 {
            return Err(PelletError::Compute("thread count must be >= 1".into()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("pellet-worker-{i}"))
            .build()
            .map_err(|e| PelletError::Compute(format!("failed to build thread pool: {e}")))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads lanes are spread across.
    pub fn thread_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for RayonBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for RayonBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn is_parallel(&self) -> bool {
        true
    }

    fn dispatch(&self, kernel: Kernel, lanes: usize, body: &(dyn Fn(usize) + Sync)) {
        trace!(kernel = kernel.name(), lanes, "dispatch");
        self.install(|| (0..lanes).into_par_iter().for_each(body));
    }

    fn dispatch_forces(&self, kernel: Kernel, particles: &mut ParticleBuffer, body: &ForceKernel<'_>) {
        trace!(kernel = kernel.name(), lanes = particles.len(), "dispatch");
        let ParticleBuffer {
            position,
            velocity,
            force,
        } = particles;
        let (position, velocity) = (position.as_slice(), velocity.as_slice());
        self.install(|| {
            force
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, f)| *f += body(i, position, velocity));
        });
    }

    fn dispatch_particles(
        &self,
        kernel: Kernel,
        particles: &mut ParticleBuffer,
        body: &ParticleKernel<'_>,
    ) {
        trace!(kernel = kernel.name(), lanes = particles.len(), "dispatch");
        let ParticleBuffer {
            position,
            velocity,
            force,
        } = particles;
        self.install(|| {
            position
                .par_iter_mut()
                .zip(velocity.par_iter_mut())
                .zip(force.par_iter_mut())
                .enumerate()
                .for_each(|(i, ((p, v), f))| {
                    body(
                        i,
                        ParticleMut {
                            position: p,
                            velocity: v,
                            force: f,
                        },
                    )
                });
        });
    }

    fn barrier(&self) {
        fence(Ordering::SeqCst);
    }
}
