//! The simulation orchestrator.
//!
//! One external tick runs `sub_steps` sub-steps. Each sub-step dispatches
//! its stages in a fixed order, with a barrier after every stage:
//!
//! ```text
//! ClearGrid → PopulateGrid → DetectAndRespond{Grid|BruteForce} → Integrate
//! ```
//!
//! The brute-force strategy has nothing to build, so its sub-steps start
//! directly at detect-and-respond.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pellet_compute::{create_backend, ComputeBackend, ParticleBuffer};
use pellet_contact::{
    BroadPhase, BroadPhaseKind, BruteForceBroadPhase, ContactModel, ContactPair, PopulateStats,
    UniformGridBroadPhase,
};
use pellet_telemetry::{EventBus, EventKind, SimulationEvent};
use pellet_types::{PelletError, PelletResult};

use crate::config::SimulationConfig;
use crate::integrator::Integrator;
use crate::seed::{seed_particles, SeedVolume};

/// Summary of one external tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick index (0-indexed).
    pub tick: u64,
    pub sub_steps: u32,
    /// Length of each sub-step (seconds).
    pub sub_dt: f32,
    /// Wall-clock time for the tick (seconds).
    pub wall_time: f64,
    /// Grid population summed over all sub-steps (zero for brute force).
    pub populate: PopulateStats,
    pub kinetic_energy: f64,
    /// Gravitational potential above the floor.
    pub potential_energy: f64,
}

impl TickResult {
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy
    }
}

/// A running particle simulation.
///
/// Owns the particle buffer, the broad-phase strategy and the compute
/// backend. The configuration is fixed at construction.
pub struct Simulation {
    config: SimulationConfig,
    model: ContactModel,
    integrator: Integrator,
    broad_phase: Box<dyn BroadPhase>,
    backend: Arc<dyn ComputeBackend>,
    particles: ParticleBuffer,
    bus: Option<EventBus>,
    tick: u64,
    /// Whether the previous tick had particles outside the grid.
    escaped: bool,
}

impl Simulation {
    /// Validates `config` and seeds `particle_count` particles at rest.
    pub fn new(config: SimulationConfig) -> PelletResult<Self> {
        config.validate()?;
        let particles = seed_particles(
            config.particle_count,
            SeedVolume::from_extent(config.seed_extent),
            config.particle_diameter,
            config.seed,
        )?;
        Self::from_particles(config, particles)
    }

    /// Builds a simulation around an existing particle buffer.
    ///
    /// The buffer length must equal `config.particle_count`.
    pub fn from_particles(config: SimulationConfig, particles: ParticleBuffer) -> PelletResult<Self> {
        config.validate()?;
        if particles.len() != config.particle_count {
            return Err(PelletError::BufferMismatch {
                expected: config.particle_count,
                actual: particles.len(),
            });
        }

        let broad_phase: Box<dyn BroadPhase> = match config.broad_phase {
            BroadPhaseKind::UniformGrid => Box::new(UniformGridBroadPhase::new(config.build_grid()?)),
            BroadPhaseKind::BruteForce => Box::new(BruteForceBroadPhase::new()),
        };
        let backend: Arc<dyn ComputeBackend> = create_backend(config.backend, config.threads)?.into();

        info!(
            particles = particles.len(),
            broad_phase = broad_phase.name(),
            backend = backend.name(),
            sub_steps = config.sub_steps,
            "simulation initialized"
        );

        Ok(Self {
            model: config.contact_model(),
            integrator: Integrator::new(config.particle_mass),
            broad_phase,
            backend,
            particles,
            bus: None,
            tick: 0,
            escaped: false,
            config,
        })
    }

    /// Replaces the compute backend chosen by the configuration.
    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Attaches a telemetry bus, flushed at the end of every tick.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Advances the simulation by one external frame of `frame_dt` seconds.
    pub fn tick(&mut self, frame_dt: f32) -> PelletResult<TickResult> {
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            return Err(PelletError::InvalidConfig(format!(
                "frame delta must be positive and finite, got {frame_dt}"
            )));
        }

        let start = Instant::now();
        let sub_steps = self.config.sub_steps;
        let sub_dt = self.config.sub_dt(frame_dt);
        self.emit(EventKind::TickBegin { frame_dt, sub_dt });

        let mut populate = PopulateStats::default();
        for sub_step in 0..sub_steps {
            let stats = self.sub_step(sub_dt);
            if self.broad_phase.kind() == BroadPhaseKind::UniformGrid {
                self.emit(EventKind::GridPopulated {
                    sub_step,
                    inserted: stats.inserted,
                    dropped: stats.dropped,
                    out_of_bounds: stats.out_of_bounds,
                });
            }
            populate.accumulate(stats);
        }

        let escaped = populate.out_of_bounds > 0;
        if escaped && !self.escaped {
            warn!(
                tick = self.tick,
                out_of_bounds = populate.out_of_bounds,
                "particles left the grid, they only collide with walls until they return"
            );
        }
        self.escaped = escaped;

        let kinetic_energy = self.particles.kinetic_energy(self.config.particle_mass);
        let potential_energy = self.potential_energy();
        let wall_time = start.elapsed().as_secs_f64();

        self.emit(EventKind::Energy {
            kinetic: kinetic_energy,
            potential: potential_energy,
        });
        self.emit(EventKind::TickEnd { wall_time, sub_steps });
        if let Some(bus) = self.bus.as_mut() {
            bus.flush();
        }

        debug!(
            tick = self.tick,
            wall_time,
            kinetic_energy,
            dropped = populate.dropped,
            "tick complete"
        );

        let result = TickResult {
            tick: self.tick,
            sub_steps,
            sub_dt,
            wall_time,
            populate,
            kinetic_energy,
            potential_energy,
        };
        self.tick += 1;
        Ok(result)
    }

    /// Runs `ticks` ticks of `frame_dt`, returning each tick's summary.
    pub fn run(&mut self, ticks: u64, frame_dt: f32) -> PelletResult<Vec<TickResult>> {
        (0..ticks).map(|_| self.tick(frame_dt)).collect()
    }

    fn sub_step(&mut self, dt: f32) -> PopulateStats {
        let backend = self.backend.as_ref();

        let stats = self.broad_phase.prepare(backend, &self.particles);
        self.broad_phase
            .detect_and_respond(backend, &self.model, &mut self.particles);
        backend.barrier();
        self.integrator.step(backend, &mut self.particles, dt);
        backend.barrier();

        stats
    }

    fn emit(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit(SimulationEvent::new(self.tick, kind));
        }
    }

    /// Flushes and finalizes the telemetry bus, if any.
    pub fn finish(&mut self) {
        if let Some(bus) = self.bus.as_mut() {
            bus.finish();
        }
    }

    /// Current particle state.
    pub fn particles(&self) -> &ParticleBuffer {
        &self.particles
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn model(&self) -> &ContactModel {
        &self.model
    }

    pub fn broad_phase(&self) -> &dyn BroadPhase {
        self.broad_phase.as_ref()
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// Ticks completed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Overlapping pairs at the current positions, as seen by the
    /// configured broad phase.
    ///
    /// Rebuilds the grid from the current positions first.
    pub fn contact_pairs(&mut self) -> Vec<ContactPair> {
        self.broad_phase.prepare(self.backend.as_ref(), &self.particles);
        self.broad_phase
            .contact_pairs(&self.model, self.particles.positions())
    }

    /// Largest distance any particle centre sits outside the walls.
    pub fn max_wall_violation(&self) -> f32 {
        self.particles
            .positions()
            .iter()
            .map(|&p| self.model.walls.violation(p))
            .fold(0.0, f32::max)
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.kinetic_energy(self.config.particle_mass)
    }

    /// Gravitational potential measured from the floor.
    pub fn potential_energy(&self) -> f64 {
        self.particles.potential_energy(
            self.config.particle_mass,
            self.config.gravity_coefficient,
            self.model.walls.floor_y,
        )
    }
}
