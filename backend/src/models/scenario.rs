//! Episode scenario: outbreak timing, population, capacity, rates.
//!
//! A `Scenario` is immutable for the lifetime of an engine. Outbreak timing
//! is a tagged union so the without-outbreak case cannot share (and
//! clobber) fields with the with-outbreak case; an episode either has a
//! full outbreak timeline or none at all.
//!
//! # Critical Invariants
//!
//! 1. A validated scenario stays valid: no engine code mutates it
//! 2. `vaccine_day >= outbreak_day` whenever an outbreak exists
//! 3. Sampled scenarios always pass `validate`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::CostRates;
use crate::models::disease::{DiseaseParams, InterventionEffects};
use crate::rng::RngManager;

/// Default hard horizon for episodes without an outbreak.
pub const DEFAULT_MAX_DAY: u32 = 1000;

/// Errors raised when a scenario (or sampler configuration) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("population must be positive")]
    ZeroPopulation,

    #[error("hospital capacity must be positive")]
    ZeroHospitalCapacity,

    #[error("max_day must be positive")]
    ZeroHorizon,

    #[error("an outbreak needs at least one index case")]
    ZeroIndexCases,

    #[error("vaccine day {vaccine_day} precedes outbreak day {outbreak_day}")]
    VaccineBeforeOutbreak { vaccine_day: u32, outbreak_day: u32 },

    #[error("rate {name} = {value} is outside its valid range")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("combined daily exit probabilities for {compartment} exceed 1 (got {total})")]
    ExitProbabilitiesExceedOne { compartment: &'static str, total: f64 },

    #[error(
        "intervention multipliers must satisfy 0 < isolate_all < isolate_symptomatic < recommend < 1"
    )]
    UnorderedInterventionEffects,

    #[error("intervention costs must rise with stringency (recommend < isolate_symptomatic < isolate_all)")]
    UnorderedInterventionCosts,

    #[error("cost rate {name} = {value} must be finite and nonnegative")]
    NegativeCostRate { name: &'static str, value: f64 },

    #[error("sampler range {name} is inverted ({lo}..{hi})")]
    InvertedRange { name: &'static str, lo: u32, hi: u32 },

    #[error("p_no_outbreak = {value} is not a probability")]
    InvalidBranchProbability { value: f64 },
}

/// Outbreak timing for one episode.
///
/// Exactly one of the two shapes exists per scenario; there is no sentinel
/// day value and no way to carry vaccine timing without outbreak timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutbreakSchedule {
    /// No outbreak ever occurs; the population idles until the horizon.
    NoOutbreak { max_day: u32 },

    /// An outbreak seeds `index_cases` at `outbreak_day`; a vaccine unlocks
    /// at `vaccine_day` (never before the outbreak).
    Outbreak {
        outbreak_day: u32,
        vaccine_day: u32,
        max_day: u32,
        index_cases: u64,
    },
}

impl OutbreakSchedule {
    /// Hard horizon: the episode is forced to finish at this day.
    pub fn max_day(&self) -> u32 {
        match self {
            OutbreakSchedule::NoOutbreak { max_day } => *max_day,
            OutbreakSchedule::Outbreak { max_day, .. } => *max_day,
        }
    }

    /// Day the outbreak seeds, if there is one.
    pub fn outbreak_day(&self) -> Option<u32> {
        match self {
            OutbreakSchedule::NoOutbreak { .. } => None,
            OutbreakSchedule::Outbreak { outbreak_day, .. } => Some(*outbreak_day),
        }
    }

    /// Day the vaccine unlocks, if there is an outbreak.
    pub fn vaccine_day(&self) -> Option<u32> {
        match self {
            OutbreakSchedule::NoOutbreak { .. } => None,
            OutbreakSchedule::Outbreak { vaccine_day, .. } => Some(*vaccine_day),
        }
    }

    /// Number of index cases seeded at the outbreak day (0 without one).
    pub fn index_cases(&self) -> u64 {
        match self {
            OutbreakSchedule::NoOutbreak { .. } => 0,
            OutbreakSchedule::Outbreak { index_cases, .. } => *index_cases,
        }
    }

    /// Whether this schedule contains an outbreak at all.
    pub fn has_outbreak(&self) -> bool {
        matches!(self, OutbreakSchedule::Outbreak { .. })
    }
}

/// Immutable configuration for one episode.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::Scenario;
///
/// let scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
/// assert!(scenario.validate().is_ok());
/// assert_eq!(scenario.max_day(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Outbreak timing (tagged union, see [`OutbreakSchedule`]).
    pub schedule: OutbreakSchedule,

    /// Closed population; the compartments must sum to this forever.
    pub population: u64,

    /// Critical-care beds. Critical cases above this face elevated
    /// fatality and incur the overflow penalty.
    pub hospital_capacity: u64,

    /// Doses administered per day once the vaccine is available, capped by
    /// the remaining susceptible pool.
    pub daily_vaccinations: u64,

    /// Disease progression rates.
    pub disease: DiseaseParams,

    /// Transmission multipliers of the three interventions.
    pub interventions: InterventionEffects,

    /// Cost rates for the per-day cost accrual.
    pub costs: CostRates,
}

impl Scenario {
    /// Scenario with no outbreak: the population idles until `max_day`.
    pub fn no_outbreak(population: u64, max_day: u32) -> Self {
        Self {
            schedule: OutbreakSchedule::NoOutbreak { max_day },
            ..Self::baseline(population)
        }
    }

    /// Scenario seeding one index case at `outbreak_day`, vaccine at
    /// `vaccine_day`, forced finish at `max_day`. Remaining fields take
    /// population-proportional defaults.
    pub fn with_outbreak(population: u64, outbreak_day: u32, vaccine_day: u32, max_day: u32) -> Self {
        Self {
            schedule: OutbreakSchedule::Outbreak {
                outbreak_day,
                vaccine_day,
                max_day,
                index_cases: 1,
            },
            ..Self::baseline(population)
        }
    }

    /// Shared defaults: beds for 0.1% of the population, doses for 0.5% of
    /// the population per day.
    fn baseline(population: u64) -> Self {
        Self {
            schedule: OutbreakSchedule::NoOutbreak {
                max_day: DEFAULT_MAX_DAY,
            },
            population,
            hospital_capacity: (population / 1000).max(1),
            daily_vaccinations: population / 200,
            disease: DiseaseParams::default(),
            interventions: InterventionEffects::default(),
            costs: CostRates::default(),
        }
    }

    /// Hard horizon of this scenario.
    pub fn max_day(&self) -> u32 {
        self.schedule.max_day()
    }

    /// Validate the whole configuration. Called by the engine constructor;
    /// an invalid scenario never produces an engine.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.population == 0 {
            return Err(ScenarioError::ZeroPopulation);
        }
        if self.hospital_capacity == 0 {
            return Err(ScenarioError::ZeroHospitalCapacity);
        }
        if self.schedule.max_day() == 0 {
            return Err(ScenarioError::ZeroHorizon);
        }

        if let OutbreakSchedule::Outbreak {
            outbreak_day,
            vaccine_day,
            index_cases,
            ..
        } = self.schedule
        {
            if index_cases == 0 {
                return Err(ScenarioError::ZeroIndexCases);
            }
            if vaccine_day < outbreak_day {
                return Err(ScenarioError::VaccineBeforeOutbreak {
                    vaccine_day,
                    outbreak_day,
                });
            }
        }

        self.disease.validate()?;
        self.interventions.validate()?;
        self.costs.validate()?;

        Ok(())
    }
}

/// Configuration for episode scenario sampling.
///
/// Defaults describe the training distribution: half the episodes carry no
/// outbreak at all (so a control policy can learn that interventions are
/// wasted there), outbreak days spread over the first 300 days, and the
/// vaccine trails the outbreak by 400-700 days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Probability an episode has no outbreak.
    pub p_no_outbreak: f64,

    /// Outbreak day, drawn uniformly from this inclusive range.
    pub outbreak_day_range: (u32, u32),

    /// Vaccine lag after the outbreak day, drawn uniformly from this
    /// inclusive range.
    pub vaccine_lag_range: (u32, u32),

    /// Horizon for no-outbreak episodes.
    pub no_outbreak_max_day: u32,

    /// Horizon for outbreak episodes; long enough to watch extinction or
    /// vaccine-driven resolution even for the latest vaccine days.
    pub outbreak_max_day: u32,

    /// Index cases seeded at the outbreak day.
    pub index_cases: u64,

    pub population: u64,
    pub hospital_capacity: u64,
    pub daily_vaccinations: u64,
    pub disease: DiseaseParams,
    pub interventions: InterventionEffects,
    pub costs: CostRates,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            p_no_outbreak: 0.5,
            outbreak_day_range: (0, 300),
            vaccine_lag_range: (400, 700),
            no_outbreak_max_day: DEFAULT_MAX_DAY,
            outbreak_max_day: 2000,
            index_cases: 1,
            population: 1_000_000,
            hospital_capacity: 1_000,
            daily_vaccinations: 5_000,
            disease: DiseaseParams::default(),
            interventions: InterventionEffects::default(),
            costs: CostRates::default(),
        }
    }
}

/// Samples episode scenarios from a configured distribution.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::{RngManager, SamplerConfig, ScenarioSampler};
///
/// let sampler = ScenarioSampler::new(SamplerConfig::default()).unwrap();
/// let mut rng = RngManager::new(42);
/// let scenario = sampler.sample(&mut rng);
/// assert!(scenario.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioSampler {
    config: SamplerConfig,
}

impl ScenarioSampler {
    /// Create a sampler, rejecting configurations that could ever produce
    /// an invalid scenario.
    pub fn new(config: SamplerConfig) -> Result<Self, ScenarioError> {
        if !config.p_no_outbreak.is_finite() || !(0.0..=1.0).contains(&config.p_no_outbreak) {
            return Err(ScenarioError::InvalidBranchProbability {
                value: config.p_no_outbreak,
            });
        }
        for (name, (lo, hi)) in [
            ("outbreak_day_range", config.outbreak_day_range),
            ("vaccine_lag_range", config.vaccine_lag_range),
        ] {
            if lo > hi {
                return Err(ScenarioError::InvertedRange { name, lo, hi });
            }
        }

        // Both variants must validate with the shared fields.
        let sampler = Self { config };
        sampler.build_no_outbreak().validate()?;
        sampler
            .build_outbreak(
                sampler.config.outbreak_day_range.1,
                sampler.config.vaccine_lag_range.1,
            )
            .validate()?;

        Ok(sampler)
    }

    /// The configured distribution.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw one scenario.
    ///
    /// Draw order is fixed (branch, outbreak day, vaccine lag) and the day
    /// interpolation below is part of the reproducibility contract, so
    /// recorded episodes replay exactly.
    pub fn sample(&self, rng: &mut RngManager) -> Scenario {
        if rng.next_f64() < self.config.p_no_outbreak {
            return self.build_no_outbreak();
        }

        let outbreak_day = lerp_day(rng.next_f64(), self.config.outbreak_day_range);
        let vaccine_lag = lerp_day(rng.next_f64(), self.config.vaccine_lag_range);
        self.build_outbreak(outbreak_day, vaccine_lag)
    }

    fn build_no_outbreak(&self) -> Scenario {
        Scenario {
            schedule: OutbreakSchedule::NoOutbreak {
                max_day: self.config.no_outbreak_max_day,
            },
            population: self.config.population,
            hospital_capacity: self.config.hospital_capacity,
            daily_vaccinations: self.config.daily_vaccinations,
            disease: self.config.disease.clone(),
            interventions: self.config.interventions.clone(),
            costs: self.config.costs.clone(),
        }
    }

    fn build_outbreak(&self, outbreak_day: u32, vaccine_lag: u32) -> Scenario {
        Scenario {
            schedule: OutbreakSchedule::Outbreak {
                outbreak_day,
                vaccine_day: outbreak_day + vaccine_lag,
                max_day: self.config.outbreak_max_day,
                index_cases: self.config.index_cases,
            },
            population: self.config.population,
            hospital_capacity: self.config.hospital_capacity,
            daily_vaccinations: self.config.daily_vaccinations,
            disease: self.config.disease.clone(),
            interventions: self.config.interventions.clone(),
            costs: self.config.costs.clone(),
        }
    }
}

/// Map one uniform draw x ∈ [0,1) onto an inclusive day range as
/// `(1 - x) * lo + x * hi`, truncated toward zero.
fn lerp_day(x: f64, (lo, hi): (u32, u32)) -> u32 {
    ((1.0 - x) * lo as f64 + x * hi as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_outbreak_scenario_valid() {
        let scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.schedule.outbreak_day(), Some(10));
        assert_eq!(scenario.schedule.vaccine_day(), Some(410));
        assert_eq!(scenario.schedule.index_cases(), 1);
    }

    #[test]
    fn test_no_outbreak_scenario_has_no_timings() {
        let scenario = Scenario::no_outbreak(10_000, 200);
        assert!(scenario.validate().is_ok());
        assert!(!scenario.schedule.has_outbreak());
        assert_eq!(scenario.schedule.outbreak_day(), None);
        assert_eq!(scenario.schedule.vaccine_day(), None);
        assert_eq!(scenario.max_day(), 200);
    }

    #[test]
    fn test_rejects_vaccine_before_outbreak() {
        let scenario = Scenario::with_outbreak(1_000_000, 100, 50, 1000);
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::VaccineBeforeOutbreak {
                vaccine_day: 50,
                outbreak_day: 100
            })
        );
    }

    #[test]
    fn test_rejects_zero_population() {
        let scenario = Scenario::no_outbreak(0, 100);
        assert_eq!(scenario.validate(), Err(ScenarioError::ZeroPopulation));
    }

    #[test]
    fn test_rejects_zero_hospital_capacity() {
        let mut scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
        scenario.hospital_capacity = 0;
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::ZeroHospitalCapacity)
        );
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let scenario = Scenario::no_outbreak(1_000, 0);
        assert_eq!(scenario.validate(), Err(ScenarioError::ZeroHorizon));
    }

    #[test]
    fn test_rejects_zero_index_cases() {
        let mut scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
        scenario.schedule = OutbreakSchedule::Outbreak {
            outbreak_day: 10,
            vaccine_day: 410,
            max_day: 1000,
            index_cases: 0,
        };
        assert_eq!(scenario.validate(), Err(ScenarioError::ZeroIndexCases));
    }

    #[test]
    fn test_scenario_serde_round_trip() {
        let scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
        let json = serde_json::to_string(&scenario).unwrap();
        let restored: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(scenario, restored);
    }

    #[test]
    fn test_lerp_day_endpoints() {
        assert_eq!(lerp_day(0.0, (0, 300)), 0);
        // x just under 1 maps to the top of the range (truncation keeps it inclusive)
        assert_eq!(lerp_day(0.9999999, (0, 300)), 299);
        assert_eq!(lerp_day(0.5, (400, 700)), 550);
        assert_eq!(lerp_day(0.0, (400, 700)), 400);
    }

    #[test]
    fn test_sampler_rejects_inverted_range() {
        let config = SamplerConfig {
            outbreak_day_range: (300, 0),
            ..SamplerConfig::default()
        };
        assert!(matches!(
            ScenarioSampler::new(config),
            Err(ScenarioError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_sampler_rejects_bad_branch_probability() {
        let config = SamplerConfig {
            p_no_outbreak: 1.5,
            ..SamplerConfig::default()
        };
        assert!(matches!(
            ScenarioSampler::new(config),
            Err(ScenarioError::InvalidBranchProbability { .. })
        ));
    }

    #[test]
    fn test_sampler_branch_extremes() {
        let mut rng = RngManager::new(99);

        let always_control = ScenarioSampler::new(SamplerConfig {
            p_no_outbreak: 1.0,
            ..SamplerConfig::default()
        });
        // p = 1.0 is a valid probability even though every draw goes one way
        let always_control = always_control.unwrap();
        for _ in 0..50 {
            assert!(!always_control.sample(&mut rng).schedule.has_outbreak());
        }

        let always_outbreak =
            ScenarioSampler::new(SamplerConfig {
                p_no_outbreak: 0.0,
                ..SamplerConfig::default()
            })
            .unwrap();
        for _ in 0..50 {
            let scenario = always_outbreak.sample(&mut rng);
            assert!(scenario.schedule.has_outbreak());
            assert!(scenario.validate().is_ok());
        }
    }

    #[test]
    fn test_sampled_outbreak_days_within_range() {
        let sampler = ScenarioSampler::new(SamplerConfig {
            p_no_outbreak: 0.0,
            ..SamplerConfig::default()
        })
        .unwrap();
        let mut rng = RngManager::new(7);

        for _ in 0..500 {
            let scenario = sampler.sample(&mut rng);
            let outbreak_day = scenario.schedule.outbreak_day().unwrap();
            let vaccine_day = scenario.schedule.vaccine_day().unwrap();
            assert!(outbreak_day <= 300, "outbreak day {} out of range", outbreak_day);
            let lag = vaccine_day - outbreak_day;
            assert!(
                (400..=700).contains(&lag),
                "vaccine lag {} out of range",
                lag
            );
        }
    }

    #[test]
    fn test_sampler_deterministic_per_seed() {
        let sampler = ScenarioSampler::new(SamplerConfig::default()).unwrap();
        let mut rng1 = RngManager::new(1234);
        let mut rng2 = RngManager::new(1234);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng1), sampler.sample(&mut rng2));
        }
    }
}
