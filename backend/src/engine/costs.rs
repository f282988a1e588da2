//! Cost model: intervention economics, deaths, hospital overflow.
//!
//! The day's cost is a pure function of the active interventions and the
//! day's state deltas. There is no hidden cost state beyond the running
//! totals in [`CostAccumulator`].

use serde::{Deserialize, Serialize};

use crate::models::intervention::InterventionInput;
use crate::models::scenario::ScenarioError;

/// Cost calculation rates.
///
/// All monetary values in dollars. Defaults are sized for a population of
/// one million; scale them together with the scenario population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    /// Economic cost per day of recommending distancing
    /// (lost output of voluntarily reduced activity).
    pub recommend_distancing_per_day: f64,

    /// Economic cost per day of isolating symptomatic cases
    /// (their full lost output plus enforcement).
    pub isolate_symptomatic_per_day: f64,

    /// Economic cost per day of a full stay-at-home order
    /// (lost output of everyone outside critical jobs).
    pub isolate_all_per_day: f64,

    /// Social cost per death.
    pub cost_per_death: f64,

    /// Penalty per critical case above hospital capacity, per day.
    pub overflow_cost_per_case: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            recommend_distancing_per_day: 2_000_000.0, // ~0.2% of daily output
            isolate_symptomatic_per_day: 8_000_000.0,
            isolate_all_per_day: 40_000_000.0,         // ~4% of daily output
            cost_per_death: 8_000_000.0,               // statistical value of one life
            overflow_cost_per_case: 100_000.0,
        }
    }
}

impl CostRates {
    /// Validate rates: finite, nonnegative, and intervention costs rising
    /// strictly with stringency.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (name, value) in [
            ("recommend_distancing_per_day", self.recommend_distancing_per_day),
            ("isolate_symptomatic_per_day", self.isolate_symptomatic_per_day),
            ("isolate_all_per_day", self.isolate_all_per_day),
            ("cost_per_death", self.cost_per_death),
            ("overflow_cost_per_case", self.overflow_cost_per_case),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScenarioError::NegativeCostRate { name, value });
            }
        }

        if self.recommend_distancing_per_day >= self.isolate_symptomatic_per_day
            || self.isolate_symptomatic_per_day >= self.isolate_all_per_day
        {
            return Err(ScenarioError::UnorderedInterventionCosts);
        }

        Ok(())
    }

    /// Per-day economic cost of the active interventions. Flags contribute
    /// independently, so stricter flag sets always cost at least as much.
    pub fn intervention_cost(&self, input: &InterventionInput) -> f64 {
        let mut cost = 0.0;
        if input.recommend_distancing {
            cost += self.recommend_distancing_per_day;
        }
        if input.isolate_symptomatic {
            cost += self.isolate_symptomatic_per_day;
        }
        if input.isolate_all {
            cost += self.isolate_all_per_day;
        }
        cost
    }

    /// Full cost of one day given the active interventions and the day's
    /// deaths and excess critical cases.
    pub fn day_cost(
        &self,
        input: &InterventionInput,
        new_deaths: u64,
        excess_critical: u64,
    ) -> CostBreakdown {
        CostBreakdown {
            intervention_cost: self.intervention_cost(input),
            death_cost: self.cost_per_death * new_deaths as f64,
            overflow_cost: self.overflow_cost_per_case * excess_critical as f64,
        }
    }
}

/// Cost breakdown for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Economic cost of the interventions active this day.
    pub intervention_cost: f64,

    /// Social cost of the deaths that occurred this day.
    pub death_cost: f64,

    /// Overflow penalty for critical cases beyond hospital capacity.
    pub overflow_cost: f64,
}

impl CostBreakdown {
    /// Total cost across all categories.
    pub fn total(&self) -> f64 {
        self.intervention_cost + self.death_cost + self.overflow_cost
    }
}

/// Accumulated costs over an episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAccumulator {
    /// Total economic cost of interventions.
    pub total_intervention_cost: f64,

    /// Total social cost of deaths.
    pub total_death_cost: f64,

    /// Total overflow penalties.
    pub total_overflow_cost: f64,
}

impl CostAccumulator {
    /// Create a new accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one day's costs.
    pub fn add(&mut self, costs: &CostBreakdown) {
        self.total_intervention_cost += costs.intervention_cost;
        self.total_death_cost += costs.death_cost;
        self.total_overflow_cost += costs.overflow_cost;
    }

    /// Total cost across all categories.
    pub fn total(&self) -> f64 {
        self.total_intervention_cost + self.total_death_cost + self.total_overflow_cost
    }
}
