//! # pellet-telemetry
//!
//! Event bus for simulation telemetry. The simulation emits structured
//! events (tick timing, grid population, energy) that are consumed by
//! pluggable sinks (tracing logs, in-memory capture for tests).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
