//! Simulation configuration.
//!
//! Every tunable of a run lives in one [`SimulationConfig`], fixed once a
//! [`Simulation`](crate::pipeline::Simulation) is built. Configs are plain
//! serde structs and load from TOML; missing keys fall back to the
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use pellet_compute::BackendKind;
use pellet_contact::{BoxWalls, BroadPhaseKind, ContactModel, UniformGrid};
use pellet_types::constants::{DEFAULT_SUB_STEPS, GRAVITY};
use pellet_types::math::vec3;
use pellet_types::{PelletError, PelletResult, Vec3};

/// Configuration for a particle simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles seeded by [`Simulation::new`](crate::pipeline::Simulation::new).
    pub particle_count: usize,

    /// Mass of every particle.
    pub particle_mass: f32,

    /// Particle diameter. Also the grid cell size.
    pub particle_diameter: f32,

    /// Half-width of the container. Side walls sit at `±box_size` and the
    /// floor at `-box_size`; the top is open.
    pub box_size: f32,

    /// Centre of the broad-phase grid, in world units rather than in
    /// multiples of the particle diameter (cell units). The grid origin is
    /// `grid_center - dims * particle_diameter / 2`.
    pub grid_center: [f32; 3],

    /// Minimum region covered by the grid on each axis (world units).
    pub grid_extent: [f32; 3],

    /// Normal spring stiffness.
    pub spring_coefficient: f32,

    /// Normal damping.
    pub damping_coefficient: f32,

    /// Coulomb limit on the tangential force, relative to the normal force.
    pub friction_coefficient: f32,

    /// Tangential viscous coefficient.
    pub tangential_coefficient: f32,

    /// Gravitational acceleration (m/s²), along -Y.
    pub gravity_coefficient: f32,

    /// Multiplier applied to each particle's total force.
    pub linear_force_scalar: f32,

    /// Grid or brute-force neighbour search.
    pub broad_phase: BroadPhaseKind,

    /// Integration sub-steps per external frame.
    pub sub_steps: u32,

    /// RNG seed for initial positions.
    pub seed: u64,

    /// Edge of the seeding volume. Seeding fails if `particle_count`
    /// non-overlapping particles do not fit in it.
    pub seed_extent: f32,

    /// Execution backend.
    pub backend: BackendKind,

    /// Worker threads for the rayon backend (`None` = rayon's default).
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 2048,
            particle_mass: 1.0,
            particle_diameter: 0.2,
            box_size: 2.5,
            grid_center: [0.0, 1.0, 0.0],
            grid_extent: [6.0, 8.0, 6.0],
            spring_coefficient: 20_000.0,
            damping_coefficient: 40.0,
            friction_coefficient: 0.3,
            tangential_coefficient: 1.0,
            gravity_coefficient: GRAVITY,
            linear_force_scalar: 1.0,
            broad_phase: BroadPhaseKind::UniformGrid,
            sub_steps: DEFAULT_SUB_STEPS,
            seed: 42,
            seed_extent: 5.0,
            backend: BackendKind::Rayon,
            threads: None,
        }
    }
}

impl SimulationConfig {
    /// Small brute-force run on the serial backend, for debugging.
    pub fn debug() -> Self {
        Self {
            particle_count: 64,
            broad_phase: BroadPhaseKind::BruteForce,
            backend: BackendKind::Serial,
            ..Default::default()
        }
    }

    /// Many smaller particles in the same box. Contacts are stiffer to
    /// carry the taller seeded column, with more sub-steps to match.
    pub fn dense() -> Self {
        Self {
            particle_count: 16_384,
            particle_diameter: 0.1,
            spring_coefficient: 60_000.0,
            damping_coefficient: 80.0,
            sub_steps: 10,
            ..Default::default()
        }
    }

    /// Parses a TOML document. Missing keys take their default value.
    pub fn from_toml_str(source: &str) -> PelletResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| PelletError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> PelletResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes to a TOML document.
    pub fn to_toml_string(&self) -> PelletResult<String> {
        toml::to_string_pretty(self).map_err(|e| PelletError::Serialization(e.to_string()))
    }

    pub fn radius(&self) -> f32 {
        self.particle_diameter * 0.5
    }

    /// Sub-step length for an external frame of `frame_dt`.
    pub fn sub_dt(&self, frame_dt: f32) -> f32 {
        frame_dt / self.sub_steps as f32
    }

    pub fn grid_center(&self) -> Vec3 {
        vec3(self.grid_center)
    }

    pub fn grid_extent(&self) -> Vec3 {
        vec3(self.grid_extent)
    }

    /// Centre-space container limits.
    pub fn walls(&self) -> BoxWalls {
        BoxWalls::new(self.box_size, self.radius())
    }

    /// Contact force law for this configuration.
    pub fn contact_model(&self) -> ContactModel {
        ContactModel {
            radius: self.radius(),
            spring: self.spring_coefficient,
            damping: self.damping_coefficient,
            friction: self.friction_coefficient,
            tangential: self.tangential_coefficient,
            particle_mass: self.particle_mass,
            gravity: self.gravity_coefficient,
            linear_force_scalar: self.linear_force_scalar,
            walls: self.walls(),
        }
    }

    /// Builds the broad-phase grid, centred on `grid_center`.
    pub fn build_grid(&self) -> PelletResult<UniformGrid> {
        UniformGrid::centered(self.grid_center(), self.grid_extent(), self.particle_diameter)
    }

    /// Checks every precondition a simulation relies on.
    pub fn validate(&self) -> PelletResult<()> {
        positive("particle_mass", self.particle_mass)?;
        positive("particle_diameter", self.particle_diameter)?;
        positive("box_size", self.box_size)?;
        positive("seed_extent", self.seed_extent)?;
        for (axis, extent) in ["x", "y", "z"].iter().zip(self.grid_extent) {
            positive(&format!("grid_extent.{axis}"), extent)?;
        }
        if !self.grid_center().is_finite() {
            return Err(invalid("grid_center must be finite"));
        }

        non_negative("spring_coefficient", self.spring_coefficient)?;
        non_negative("damping_coefficient", self.damping_coefficient)?;
        non_negative("friction_coefficient", self.friction_coefficient)?;
        non_negative("tangential_coefficient", self.tangential_coefficient)?;
        non_negative("gravity_coefficient", self.gravity_coefficient)?;
        if !self.linear_force_scalar.is_finite() {
            return Err(invalid("linear_force_scalar must be finite"));
        }

        if self.box_size <= self.radius() {
            return Err(invalid(format!(
                "box_size ({}) must exceed the particle radius ({})",
                self.box_size,
                self.radius()
            )));
        }
        if self.sub_steps == 0 {
            return Err(invalid("sub_steps must be >= 1"));
        }
        if self.particle_count >= u32::MAX as usize {
            return Err(invalid(format!(
                "particle_count {} exceeds the u32 index range",
                self.particle_count
            )));
        }
        if self.threads == Some(0) {
            return Err(invalid("threads must be >= 1 when set"));
        }
        if self.broad_phase == BroadPhaseKind::UniformGrid {
            UniformGrid::dims_for(self.grid_extent(), self.particle_diameter)?;
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> PelletError {
    PelletError::InvalidConfig(message.into())
}

fn positive(name: &str, value: f32) -> PelletResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> PelletResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be non-negative, got {value}")))
    }
}
