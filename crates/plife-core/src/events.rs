//! Events - a record of the structural changes made to a simulation
//!
//! Operations that change what a simulation contains hand an event to a
//! caller-supplied [`EventSink`]. Nothing is buffered globally: a caller that
//! does not care passes `&mut ()`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    ParticleAdded { type_id: usize },
    ParticleTypeAdded { id: usize },
    ParticleTypeRemoved { index: usize, particles_removed: usize },
    WorldGenerated { particles: usize, types: usize },
    Saved { target: String },
    Loaded { source: String },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::ParticleAdded { .. } => write!(f, "Added a particle"),
            EventKind::ParticleTypeAdded { .. } => write!(f, "Added a particle type"),
            EventKind::ParticleTypeRemoved { .. } => write!(f, "Removed a particle type"),
            EventKind::WorldGenerated { particles, types } => write!(
                f,
                "Generated a random world with {} particle(s) and {} type(s)",
                particles, types
            ),
            EventKind::Saved { target } => write!(f, "Wrote data to {}", target),
            EventKind::Loaded { source } => write!(f, "Loaded data from {}", source),
        }
    }
}

/// A single event with its human-readable description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub kind: EventKind,
    pub description: String,
}

impl SimEvent {
    pub fn new(kind: EventKind) -> Self {
        let description = kind.to_string();
        Self { kind, description }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Receives events from simulation operations
pub trait EventSink {
    fn record(&mut self, event: SimEvent);
}

/// Discards every event
impl EventSink for () {
    fn record(&mut self, _event: SimEvent) {}
}

impl EventSink for Vec<SimEvent> {
    fn record(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// An event together with its position in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub seq: u64,
    pub event: SimEvent,
}

/// Ordered event collector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.events.iter()
    }

    /// Events of one kind, matched by variant only
    pub fn count_matching(&self, pred: impl Fn(&EventKind) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.event.kind)).count()
    }

    /// Empty the log. Sequence numbers keep increasing.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Take every logged event, leaving the log empty
    pub fn drain(&mut self) -> Vec<LoggedEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: SimEvent) {
        self.events.push(LoggedEvent {
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }
}
