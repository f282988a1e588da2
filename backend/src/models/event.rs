//! Event logging for episode auditing and analysis.
//!
//! The engine logs an event at every structural transition of an episode:
//! outbreak seeding, vaccine arrival, hospital overflow, and the two
//! terminal transitions. Day-to-day compartment flow is deliberately not
//! logged; it is reconstructable from per-day `observe` snapshots, and
//! logging it would dwarf the transitions the log exists to surface.
//!
//! # Example
//!
//! ```rust
//! use epidemic_simulator_core_rs::models::Event;
//!
//! let event = Event::OutbreakSeeded {
//!     day: 10,
//!     index_cases: 1,
//! };
//!
//! assert_eq!(event.day(), 10);
//! assert_eq!(event.event_type(), "outbreak_seeded");
//! ```

use serde::{Deserialize, Serialize};

/// Structural transition of an episode.
///
/// All events carry the day they occurred on; events within a day are
/// logged in step-machine order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Index cases entered the population; the outbreak is now active.
    OutbreakSeeded { day: u32, index_cases: u64 },

    /// The vaccine unlocked; daily vaccinations start this day.
    VaccineAvailable { day: u32 },

    /// Critical cases exceeded hospital capacity this day.
    HospitalOverflow {
        day: u32,
        critical: u64,
        excess: u64,
    },

    /// Active infections hit zero after an outbreak; terminal.
    OutbreakExtinguished { day: u32 },

    /// The episode hit its hard horizon; terminal.
    HorizonReached { day: u32 },
}

impl Event {
    /// Day the event occurred on.
    pub fn day(&self) -> u32 {
        match self {
            Event::OutbreakSeeded { day, .. } => *day,
            Event::VaccineAvailable { day } => *day,
            Event::HospitalOverflow { day, .. } => *day,
            Event::OutbreakExtinguished { day } => *day,
            Event::HorizonReached { day } => *day,
        }
    }

    /// Event type as a stable string (for filtering and display).
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::OutbreakSeeded { .. } => "outbreak_seeded",
            Event::VaccineAvailable { .. } => "vaccine_available",
            Event::HospitalOverflow { .. } => "hospital_overflow",
            Event::OutbreakExtinguished { .. } => "outbreak_extinguished",
            Event::HorizonReached { .. } => "horizon_reached",
        }
    }
}

/// Append-only log of simulation events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty event log.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event.
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of logged events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in log order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// All events logged on a given day.
    pub fn events_at_day(&self, day: u32) -> Vec<&Event> {
        self.events.iter().filter(|e| e.day() == day).collect()
    }

    /// All events of a given type (see [`Event::event_type`]).
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
