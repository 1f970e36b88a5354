//! Benchmark scenarios: a configuration, an optional hand-placed initial
//! state, and a tick budget.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Pair repulsion**: two overlapping particles push apart
//! 2. **Floor bounce**: one particle dropped onto the floor
//! 3. **Box settle**: a seeded population settling into the box

use serde::{Deserialize, Serialize};

use pellet_compute::{BackendKind, ParticleBuffer};
use pellet_contact::BroadPhaseKind;
use pellet_solver::{Simulation, SimulationConfig};
use pellet_types::constants::DEFAULT_FRAME_DT;
use pellet_types::{PelletResult, Vec3};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Two unit spheres starting 0.1 inside each other.
    PairRepulsion,
    /// One sphere released 2 units above the floor.
    FloorBounce,
    /// Thousands of seeded spheres falling into the box.
    BoxSettle,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::PairRepulsion,
            ScenarioKind::FloorBounce,
            ScenarioKind::BoxSettle,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::PairRepulsion => "pair_repulsion",
            ScenarioKind::FloorBounce => "floor_bounce",
            ScenarioKind::BoxSettle => "box_settle",
        }
    }

    /// Looks a scenario up by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub config: SimulationConfig,
    /// Hand-placed particles. `None` seeds from the config.
    pub initial: Option<ParticleBuffer>,
    /// Number of external ticks to simulate.
    pub ticks: u32,
    /// External frame delta (seconds).
    pub frame_dt: f32,
}

impl Scenario {
    /// Two particles of diameter 1 at (0,0,0) and (0.9,0,0), no gravity.
    pub fn pair_repulsion() -> Self {
        let config = SimulationConfig {
            particle_count: 2,
            particle_diameter: 1.0,
            box_size: 5.0,
            grid_extent: [10.0; 3],
            spring_coefficient: 100.0,
            damping_coefficient: 1.0,
            friction_coefficient: 0.0,
            tangential_coefficient: 0.0,
            gravity_coefficient: 0.0,
            backend: BackendKind::Serial,
            ..Default::default()
        };
        let initial = ParticleBuffer::from_positions(vec![Vec3::ZERO, Vec3::new(0.9, 0.0, 0.0)]);

        Self {
            kind: ScenarioKind::PairRepulsion,
            config,
            initial: Some(initial),
            ticks: 120,
            frame_dt: DEFAULT_FRAME_DT,
        }
    }

    /// One particle released from rest 2 units above the floor.
    pub fn floor_bounce() -> Self {
        let config = SimulationConfig {
            particle_count: 1,
            box_size: 5.0,
            grid_extent: [10.0; 3],
            spring_coefficient: 2000.0,
            damping_coefficient: 5.0,
            friction_coefficient: 0.0,
            tangential_coefficient: 0.0,
            backend: BackendKind::Serial,
            ..Default::default()
        };
        let floor = config.walls().floor_y;
        let initial = ParticleBuffer::from_positions(vec![Vec3::new(0.0, floor + 2.0, 0.0)]);

        Self {
            kind: ScenarioKind::FloorBounce,
            config,
            initial: Some(initial),
            ticks: 360,
            frame_dt: DEFAULT_FRAME_DT,
        }
    }

    /// The default population seeded and left to settle for 5 seconds.
    pub fn box_settle() -> Self {
        Self {
            kind: ScenarioKind::BoxSettle,
            config: SimulationConfig::default(),
            initial: None,
            ticks: 300,
            frame_dt: DEFAULT_FRAME_DT,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::PairRepulsion => Self::pair_repulsion(),
            ScenarioKind::FloorBounce => Self::floor_bounce(),
            ScenarioKind::BoxSettle => Self::box_settle(),
        }
    }

    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_broad_phase(mut self, broad_phase: BroadPhaseKind) -> Self {
        self.config.broad_phase = broad_phase;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind, threads: Option<usize>) -> Self {
        self.config.backend = backend;
        self.config.threads = threads;
        self
    }

    /// Builds a fresh simulation in the scenario's initial state.
    pub fn build(&self) -> PelletResult<Simulation> {
        match &self.initial {
            Some(particles) => Simulation::from_particles(self.config.clone(), particles.clone()),
            None => Simulation::new(self.config.clone()),
        }
    }
}
