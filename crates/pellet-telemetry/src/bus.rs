//! Per-tick event queue feeding the registered sinks.
//!
//! A `pellet_solver::Simulation` emits through a shared reference while
//! its stages run: `TickBegin`, one `GridPopulated` per grid sub-step, then `Energy` and
//! `TickEnd`. Events wait in an `mpsc` queue until the tick ends and the
//! simulation flushes the bus, so sinks never run between pipeline stages.

use std::sync::mpsc::{self, Receiver, Sender};

use crate::events::SimulationEvent;
use crate::sinks::EventSink;

/// Queues simulation events during a tick and hands them to every sink
/// on [`flush`](EventBus::flush).
pub struct EventBus {
    tx: Sender<SimulationEvent>,
    rx: Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    /// When false, emitted events are discarded.
    enabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add_sink`](Self::add_sink), for attaching sinks
    /// before the bus is handed to a simulation.
    pub fn with_sink(mut self, sink: Box<dyn EventSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Pauses or resumes collection. Events emitted while paused are lost.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues `event` for the end-of-tick flush.
    pub fn emit(&self, event: SimulationEvent) {
        if self.enabled {
            // `rx` is owned by the bus, so the channel is never disconnected.
            let _ = self.tx.send(event);
        }
    }

    /// Delivers the queued events of the tick to every sink, in emission
    /// order, and returns how many were delivered.
    pub fn flush(&mut self) -> usize {
        let mut delivered = 0;
        for event in self.rx.try_iter() {
            for sink in self.sinks.iter_mut() {
                sink.handle(&event);
            }
            delivered += 1;
        }
        delivered
    }

    /// Delivers anything still queued, then finalizes every sink. Called
    /// once when a run ends.
    pub fn finish(&mut self) {
        self.flush();
        self.sinks.iter_mut().for_each(|sink| sink.finalize());
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Names of the registered sinks, in registration order.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|sink| sink.name()).collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
