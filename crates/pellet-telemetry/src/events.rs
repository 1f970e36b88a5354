//! Simulation event types.
//!
//! Structured events emitted by the simulation at fixed points of each
//! tick. Events are lightweight value types that carry just enough data
//! to be useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the engine.
///
/// Events are tagged with the tick index and carry domain-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Tick number (0-indexed).
    pub tick: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Tick started.
    TickBegin {
        /// External frame delta (seconds).
        frame_dt: f32,
        /// Integration step per sub-step (seconds).
        sub_dt: f32,
    },

    /// Tick completed.
    TickEnd {
        /// Wall-clock time for the entire tick (seconds).
        wall_time: f64,
        /// Sub-steps executed.
        sub_steps: u32,
    },

    /// Grid populate pass finished within a sub-step.
    GridPopulated {
        sub_step: u32,
        inserted: u32,
        /// Insertions rejected by a full bucket.
        dropped: u32,
        /// Particles outside the grid bounds.
        out_of_bounds: u32,
    },

    /// Energy snapshot at the end of the tick.
    Energy {
        /// Kinetic energy (0.5 * m * v^2).
        kinetic: f64,
        /// Gravitational potential above the floor (m * g * h).
        potential: f64,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given tick.
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }
}
