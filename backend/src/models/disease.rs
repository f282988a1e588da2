//! Disease progression rates and intervention strength parameters.
//!
//! All rates are daily probabilities applied to compartment populations.
//! Compartments with two exits (infectious, critical) must keep their
//! combined exit probability at or below 1 so a single split draw can
//! allocate outcomes without overcommitting the pool.

use serde::{Deserialize, Serialize};

use crate::models::scenario::ScenarioError;

/// Per-day epidemiological rates.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::DiseaseParams;
///
/// let params = DiseaseParams::default();
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseParams {
    /// Expected infectious contacts per infectious individual per day (β).
    /// Combined with the intervention multiplier and the susceptible
    /// fraction to produce new exposures.
    pub transmission_rate: f64,

    /// Daily probability an exposed individual becomes infectious
    /// (reciprocal of the mean incubation period).
    pub incubation_rate: f64,

    /// Daily probability an infectious or critical individual recovers.
    pub recovery_rate: f64,

    /// Daily probability an infectious case worsens to critical.
    pub critical_rate: f64,

    /// Daily probability a critical case dies while within hospital
    /// capacity.
    pub fatality_rate: f64,

    /// Fatality multiplier for critical cases beyond hospital capacity.
    /// The elevated rate is capped so a critical case always retains its
    /// recovery chance.
    pub overflow_fatality_multiplier: f64,
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self {
            transmission_rate: 0.35,  // R0 ≈ 3 over a ~8.7-day infectious period
            incubation_rate: 0.2,     // ~5 days exposed
            recovery_rate: 0.1,       // ~10 days to recover
            critical_rate: 0.015,     // 1.5%/day of infectious worsen
            fatality_rate: 0.03,      // 3%/day of in-capacity critical die
            overflow_fatality_multiplier: 2.0,
        }
    }
}

impl DiseaseParams {
    /// Validate that every rate is usable as a daily probability and that
    /// no compartment can be asked to emit more people than it holds.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.transmission_rate.is_finite() || self.transmission_rate < 0.0 {
            return Err(ScenarioError::RateOutOfRange {
                name: "transmission_rate",
                value: self.transmission_rate,
            });
        }

        for (name, value) in [
            ("incubation_rate", self.incubation_rate),
            ("recovery_rate", self.recovery_rate),
            ("critical_rate", self.critical_rate),
            ("fatality_rate", self.fatality_rate),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ScenarioError::RateOutOfRange { name, value });
            }
        }

        if !self.overflow_fatality_multiplier.is_finite() || self.overflow_fatality_multiplier < 1.0
        {
            return Err(ScenarioError::RateOutOfRange {
                name: "overflow_fatality_multiplier",
                value: self.overflow_fatality_multiplier,
            });
        }

        let infectious_exits = self.recovery_rate + self.critical_rate;
        if infectious_exits > 1.0 {
            return Err(ScenarioError::ExitProbabilitiesExceedOne {
                compartment: "infectious",
                total: infectious_exits,
            });
        }

        let critical_exits = self.recovery_rate + self.fatality_rate;
        if critical_exits > 1.0 {
            return Err(ScenarioError::ExitProbabilitiesExceedOne {
                compartment: "critical",
                total: critical_exits,
            });
        }

        Ok(())
    }

    /// Daily fatality probability for critical cases beyond hospital
    /// capacity. Capped so recovery + fatality never exceeds 1.
    pub fn overflow_fatality_rate(&self) -> f64 {
        (self.fatality_rate * self.overflow_fatality_multiplier).min(1.0 - self.recovery_rate)
    }
}

/// Transmission multipliers for the three interventions.
///
/// A multiplier scales the infection term while its intervention is active;
/// smaller means stronger. Stricter interventions must be strictly stronger:
/// `isolate_all < isolate_symptomatic < recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionEffects {
    /// Voluntary distancing recommendation (mildest).
    pub recommend_multiplier: f64,

    /// Mandatory isolation of symptomatic cases.
    pub isolate_symptomatic_multiplier: f64,

    /// Mandatory isolation of the whole population (strictest).
    pub isolate_all_multiplier: f64,
}

impl Default for InterventionEffects {
    fn default() -> Self {
        Self {
            recommend_multiplier: 0.8,
            isolate_symptomatic_multiplier: 0.6,
            isolate_all_multiplier: 0.35,
        }
    }
}

impl InterventionEffects {
    /// Validate the multipliers: each in (0, 1), strictly ordered by
    /// stringency.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (name, value) in [
            ("recommend_multiplier", self.recommend_multiplier),
            (
                "isolate_symptomatic_multiplier",
                self.isolate_symptomatic_multiplier,
            ),
            ("isolate_all_multiplier", self.isolate_all_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ScenarioError::RateOutOfRange { name, value });
            }
        }

        let ordered = self.isolate_all_multiplier < self.isolate_symptomatic_multiplier
            && self.isolate_symptomatic_multiplier < self.recommend_multiplier;
        if !ordered {
            return Err(ScenarioError::UnorderedInterventionEffects);
        }

        Ok(())
    }
}
