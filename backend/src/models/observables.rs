//! Caller-visible snapshot of a running simulation.

use serde::{Deserialize, Serialize};

use crate::engine::Phase;

/// Everything a controller is allowed to see after a step.
///
/// Compartment counts are absolute; consumers that want ratios divide by
/// `population` (or `hospital_capacity` for the critical load) themselves.
/// Repeated calls to `observe` between steps return identical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observables {
    /// Current simulated day (0 before the first step).
    pub day: u32,

    /// Scenario population, constant for the whole episode.
    pub population: u64,

    pub susceptible: u64,
    pub exposed: u64,
    pub infected: u64,
    pub critical: u64,
    pub recovered: u64,
    pub dead: u64,
    pub vaccinated: u64,

    /// Critical-care beds available in the scenario.
    pub hospital_capacity: u64,

    /// Whether vaccination is running.
    pub vaccine_available: bool,

    /// Lifecycle phase after the most recent step.
    pub phase: Phase,

    /// Cost accrued by the most recent step (0.0 before the first step).
    pub step_cost: f64,

    /// Total cost accrued since day 0.
    pub cumulative_cost: f64,

    /// Whether the episode has reached a terminal phase.
    pub finished: bool,
}

impl Observables {
    /// Everyone currently carrying the disease (E + I + C).
    pub fn active_infections(&self) -> u64 {
        self.exposed + self.infected + self.critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Observables {
        Observables {
            day: 42,
            population: 1_000_000,
            susceptible: 900_000,
            exposed: 30_000,
            infected: 50_000,
            critical: 2_000,
            recovered: 16_000,
            dead: 1_000,
            vaccinated: 1_000,
            hospital_capacity: 1_000,
            vaccine_available: false,
            phase: Phase::Active,
            step_cost: 40_000_000.0,
            cumulative_cost: 900_000_000.0,
            finished: false,
        }
    }

    #[test]
    fn test_active_infections_sums_three_compartments() {
        assert_eq!(sample().active_infections(), 82_000);
    }

    #[test]
    fn test_observables_serde_round_trip() {
        let obs = sample();
        let json = serde_json::to_string(&obs).unwrap();
        let restored: Observables = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, restored);
    }
}
