//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (log through `tracing`, capture in memory, ...).

use std::sync::{Arc, Mutex};

use tracing::Level;

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Shared view of the events a [`VecSink`] has collected.
pub type EventLog = Arc<Mutex<Vec<SimulationEvent>>>;

/// Collects events in memory for testing and inspection.
///
/// The sink is boxed into the bus, so collected events are read back
/// through the [`EventLog`] handle returned by [`VecSink::log`].
#[derive(Default)]
pub struct VecSink {
    events: EventLog,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected events, valid after the sink is moved.
    pub fn log(&self) -> EventLog {
        Arc::clone(&self.events)
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Tick boundaries are logged at `level`; grid overflow is always a
/// warning.
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

macro_rules! event_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match &event.kind {
            EventKind::GridPopulated {
                sub_step,
                dropped,
                out_of_bounds,
                ..
            } if *dropped > 0 => {
                tracing::warn!(
                    tick = event.tick,
                    sub_step,
                    dropped,
                    out_of_bounds,
                    "grid overflow"
                );
            }
            kind => event_at!(self.level, tick = event.tick, event = ?kind, "simulation_event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
