//! Ordered event channel between the engine and the bus pump.
//!
//! Events posted on one bus are popped in posting order. Any number of threads may
//! post; a single pump consumes. Every clone refers to the same channel.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::engine::EngineState;

/// Object an event originated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventSource {
    /// The player element owned by the controller.
    Player,
    /// Any element inside the inner pipeline.
    Element(String),
}

/// Events carried on a bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    StateChanged {
        source: EventSource,
        old: EngineState,
        new: EngineState,
    },
    EndOfStream,
    /// Posted by the controller to stop the pump; always the last event it reads.
    ShutdownSentinel,
    /// Anything the pump does not act on, tagged with the engine's message kind.
    Other(String),
}

impl Event {
    /// Short name of the variant for logs.
    pub fn kind(&self) -> &str {
        match self {
            Event::StateChanged { .. } => "state-changed",
            Event::EndOfStream => "eos",
            Event::ShutdownSentinel => "shutdown-sentinel",
            Event::Other(kind) => kind.as_str(),
        }
    }
}

/// Cloneable handle to one bus.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty, unbounded bus.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Append an event. Returns `false` if the bus can no longer deliver it.
    pub fn post(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Pop the next event.
    ///
    /// `None` as timeout blocks until an event arrives. Returns `None` on timeout.
    pub fn pop(&self, timeout: Option<Duration>) -> Option<Event> {
        match timeout {
            None => self.rx.recv().ok(),
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(event) => Some(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
            },
        }
    }

    /// Events posted but not yet popped (best-effort snapshot).
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Whether `other` is a handle to the same bus.
    pub fn same_bus(&self, other: &EventBus) -> bool {
        self.tx.same_channel(&other.tx)
    }
}
