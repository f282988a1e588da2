//! Simulation engine: the day-stepped epidemic state machine.
//!
//! The engine owns one scenario, one compartmental state, one seeded RNG
//! and the episode's cost and event records. Each `step` call executes one
//! simulated day:
//!
//! 1. Terminal no-op check (finished episodes never change again)
//! 2. Advance the day
//! 3. Pre-outbreak passthrough (no flows, no cost) until the outbreak day
//! 4. Seed index cases when the outbreak day arrives
//! 5. Unlock the vaccine when its day arrives
//! 6. Draw compartment flows from the pre-step snapshot
//! 7. Apply flows simultaneously
//! 8. Accrue the day's cost
//! 9. Reclassify the phase
//! 10. Re-assert population conservation
//!
//! # Critical Invariants
//!
//! 1. Compartments sum to the scenario population after every step
//! 2. `cumulative_cost` never decreases
//! 3. Terminal phases are absorbing: no field changes once finished
//! 4. `observe` is pure: no RNG draws, no mutation
//!
//! # Determinism
//!
//! All randomness flows through the seeded `RngManager`. Same scenario +
//! same seed + same input sequence = identical trajectories.

use serde::{Deserialize, Serialize};

use crate::engine::checkpoint::{compute_scenario_hash, EngineSnapshot};
use crate::engine::costs::{CostAccumulator, CostBreakdown};
use crate::models::event::{Event, EventLog};
use crate::models::intervention::InterventionInput;
use crate::models::observables::Observables;
use crate::models::scenario::{Scenario, ScenarioError};
use crate::models::state::{DailyFlows, EpidemicState};
use crate::rng::RngManager;

/// Lifecycle phase of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Before the outbreak day (or forever, without an outbreak).
    PreOutbreak,
    /// Outbreak seeded and infections remain.
    Active,
    /// Outbreak seeded and no infections remain. Terminal.
    Extinguished,
    /// The hard horizon was reached. Terminal.
    HorizonReached,
}

impl Phase {
    /// Whether the phase ends the episode.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Extinguished | Phase::HorizonReached)
    }

    /// Stable string form (for display and FFI).
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreOutbreak => "pre_outbreak",
            Phase::Active => "active",
            Phase::Extinguished => "extinguished",
            Phase::HorizonReached => "horizon_reached",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Scenario failed validation at engine construction.
    InvalidScenario(ScenarioError),

    /// Compartments stopped summing to the population. Engine bug,
    /// never masked.
    ConservationViolation {
        day: u32,
        expected: u64,
        actual: u64,
    },

    /// Snapshot was taken under a different scenario.
    SnapshotMismatch { expected: String, actual: String },

    /// Snapshot state failed integrity checks.
    StateValidationError(String),

    /// Serialization failure (snapshot encode/decode).
    SerializationError(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidScenario(err) => write!(f, "Invalid scenario: {}", err),
            SimulationError::ConservationViolation {
                day,
                expected,
                actual,
            } => write!(
                f,
                "Conservation violated on day {}: compartments sum to {}, population is {}",
                day, actual, expected
            ),
            SimulationError::SnapshotMismatch { expected, actual } => write!(
                f,
                "Snapshot scenario mismatch: snapshot has {}, scenario hashes to {}",
                actual, expected
            ),
            SimulationError::StateValidationError(msg) => {
                write!(f, "State validation error: {}", msg)
            }
            SimulationError::SerializationError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<ScenarioError> for SimulationError {
    fn from(err: ScenarioError) -> Self {
        SimulationError::InvalidScenario(err)
    }
}

/// Day-stepped epidemic simulation engine.
///
/// The engine exclusively owns its scenario and state; `observe` hands out
/// value copies with no back-reference. Instances are independent, so
/// parallelism is achieved by running one engine per worker, never by
/// sharing one.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::{InterventionInput, Scenario, SimulationEngine};
///
/// let scenario = Scenario::with_outbreak(100_000, 10, 410, 1000);
/// let mut engine = SimulationEngine::new(scenario, 42).unwrap();
///
/// while !engine.finished() {
///     engine.step(InterventionInput::none()).unwrap();
/// }
///
/// let obs = engine.observe();
/// assert!(obs.finished);
/// assert!(obs.day <= 1000);
/// ```
#[derive(Debug)]
pub struct SimulationEngine {
    /// Immutable episode configuration.
    scenario: Scenario,

    /// Compartment counts and the day counter.
    state: EpidemicState,

    /// Deterministic RNG; the only source of randomness.
    rng: RngManager,

    /// Lifecycle phase after the most recent step.
    phase: Phase,

    /// Set when index cases have been seeded.
    outbreak_started: bool,

    /// Set when the vaccine day has been reached.
    vaccine_available: bool,

    /// Everyone who ever entered the exposed compartment, seeds included.
    total_infections: u64,

    /// Cost of the most recent step.
    last_step_costs: CostBreakdown,

    /// Running cost totals.
    costs: CostAccumulator,

    /// Structural transition log.
    event_log: EventLog,
}

impl SimulationEngine {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an engine for one episode.
    ///
    /// # Arguments
    ///
    /// * `scenario` - Episode configuration; validated here, owned by the
    ///   engine afterwards
    /// * `seed` - RNG seed; a seed of 0 is remapped internally
    ///
    /// # Returns
    ///
    /// * `Ok(SimulationEngine)` - Engine at day 0, nobody infected
    /// * `Err(SimulationError)` - Scenario validation failed
    pub fn new(scenario: Scenario, seed: u64) -> Result<Self, SimulationError> {
        scenario.validate()?;

        let state = EpidemicState::new(scenario.population);
        Ok(Self {
            state,
            rng: RngManager::new(seed),
            phase: Phase::PreOutbreak,
            outbreak_started: false,
            vaccine_available: false,
            total_infections: 0,
            last_step_costs: CostBreakdown::default(),
            costs: CostAccumulator::new(),
            event_log: EventLog::new(),
            scenario,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The episode configuration.
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Current compartmental state.
    pub fn state(&self) -> &EpidemicState {
        &self.state
    }

    /// Current simulated day.
    pub fn day(&self) -> u32 {
        self.state.day()
    }

    /// Lifecycle phase after the most recent step.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the episode has reached a terminal phase.
    pub fn finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether index cases have been seeded.
    pub fn outbreak_started(&self) -> bool {
        self.outbreak_started
    }

    /// Whether vaccination is running.
    pub fn vaccine_available(&self) -> bool {
        self.vaccine_available
    }

    /// Everyone who ever entered the exposed compartment, seeds included.
    pub fn total_infections(&self) -> u64 {
        self.total_infections
    }

    /// Cost breakdown of the most recent step.
    pub fn last_step_costs(&self) -> &CostBreakdown {
        &self.last_step_costs
    }

    /// Running cost totals.
    pub fn costs(&self) -> &CostAccumulator {
        &self.costs
    }

    /// Structural transition log.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Snapshot the caller-visible state.
    ///
    /// Pure read: never draws randomness, never mutates state. Repeated
    /// calls between steps return identical values.
    pub fn observe(&self) -> Observables {
        Observables {
            day: self.state.day(),
            population: self.scenario.population,
            susceptible: self.state.susceptible(),
            exposed: self.state.exposed(),
            infected: self.state.infected(),
            critical: self.state.critical(),
            recovered: self.state.recovered(),
            dead: self.state.dead(),
            vaccinated: self.state.vaccinated(),
            hospital_capacity: self.scenario.hospital_capacity,
            vaccine_available: self.vaccine_available,
            phase: self.phase,
            step_cost: self.last_step_costs.total(),
            cumulative_cost: self.costs.total(),
            finished: self.phase.is_terminal(),
        }
    }

    // ========================================================================
    // Step Machine
    // ========================================================================

    /// Execute one simulated day.
    ///
    /// Calling `step` on a finished engine is a benign no-op: the terminal
    /// observables, day included, never change. The only error a step can
    /// produce is a conservation violation, which indicates an engine bug
    /// and is never silently corrected.
    pub fn step(&mut self, input: InterventionInput) -> Result<(), SimulationError> {
        if self.phase.is_terminal() {
            return Ok(());
        }

        self.state.advance_day();
        let day = self.state.day();

        let outbreak_due = match self.scenario.schedule.outbreak_day() {
            Some(outbreak_day) => day >= outbreak_day,
            None => false,
        };

        // Pre-outbreak passthrough: no flows, no cost.
        if !self.outbreak_started && !outbreak_due {
            self.last_step_costs = CostBreakdown::default();
            self.classify();
            return self.check_conservation();
        }

        // Flows are drawn from the snapshot taken before seeding, so index
        // cases seeded this day start progressing tomorrow.
        let pre = self.state.clone();

        if !self.outbreak_started {
            let index_cases = self
                .scenario
                .schedule
                .index_cases()
                .min(self.state.susceptible());
            self.state.seed_infections(index_cases);
            self.total_infections += index_cases;
            self.outbreak_started = true;
            self.event_log.log(Event::OutbreakSeeded { day, index_cases });
        }

        if !self.vaccine_available {
            if let Some(vaccine_day) = self.scenario.schedule.vaccine_day() {
                if day >= vaccine_day {
                    self.vaccine_available = true;
                    self.event_log.log(Event::VaccineAvailable { day });
                }
            }
        }

        let multiplier = input.transmission_multiplier(&self.scenario.interventions);
        let flows = self.compute_flows(&pre, multiplier);

        let excess_critical = pre.critical().saturating_sub(self.scenario.hospital_capacity);
        if excess_critical > 0 {
            self.event_log.log(Event::HospitalOverflow {
                day,
                critical: pre.critical(),
                excess: excess_critical,
            });
        }

        self.state.apply_flows(&flows);
        self.total_infections += flows.new_exposed;

        let day_costs = self
            .scenario
            .costs
            .day_cost(&input, flows.new_deaths, excess_critical);
        self.last_step_costs = day_costs;
        self.costs.add(&day_costs);

        self.classify();
        self.check_conservation()
    }

    /// Draw one day of compartment flows from the pre-step snapshot.
    ///
    /// Every draw is bounded by its source pool, so the flows can never
    /// overdraw a compartment.
    fn compute_flows(&mut self, pre: &EpidemicState, multiplier: f64) -> DailyFlows {
        let disease = &self.scenario.disease;

        // S -> E: per-susceptible infection hazard from the infectious
        // pool, scaled by the intervention multiplier.
        let pressure = disease.transmission_rate * multiplier * pre.infected() as f64
            / self.scenario.population as f64;
        let p_infection = 1.0 - (-pressure).exp();
        let new_exposed = self.rng.binomial(pre.susceptible(), p_infection);

        // E -> I
        let new_infected = self.rng.binomial(pre.exposed(), disease.incubation_rate);

        // I -> {R, C}
        let (infected_recoveries, new_critical) =
            self.rng
                .split_binomial(pre.infected(), disease.recovery_rate, disease.critical_rate);

        // C -> {R, D}: cases beyond hospital capacity face the elevated
        // overflow fatality rate for this day.
        let within_capacity = pre.critical().min(self.scenario.hospital_capacity);
        let excess = pre.critical() - within_capacity;

        let (mut critical_recoveries, mut new_deaths) = self.rng.split_binomial(
            within_capacity,
            disease.recovery_rate,
            disease.fatality_rate,
        );
        if excess > 0 {
            let (recoveries, deaths) = self.rng.split_binomial(
                excess,
                disease.recovery_rate,
                disease.overflow_fatality_rate(),
            );
            critical_recoveries += recoveries;
            new_deaths += deaths;
        }

        // S -> V: capped by the live susceptible pool net of today's new
        // exposures (the live pool differs from the snapshot only on the
        // seeding day, when the infection draw is always zero).
        let new_vaccinated = if self.vaccine_available {
            self.scenario
                .daily_vaccinations
                .min(self.state.susceptible() - new_exposed)
        } else {
            0
        };

        DailyFlows {
            new_exposed,
            new_infected,
            infected_recoveries,
            new_critical,
            critical_recoveries,
            new_deaths,
            new_vaccinated,
        }
    }

    /// Reclassify the lifecycle phase. The horizon wins over extinction
    /// when both trigger on the same day.
    fn classify(&mut self) {
        let day = self.state.day();

        if day >= self.scenario.max_day() {
            self.phase = Phase::HorizonReached;
            self.event_log.log(Event::HorizonReached { day });
        } else if self.outbreak_started && self.state.active_infections() == 0 {
            self.phase = Phase::Extinguished;
            self.event_log.log(Event::OutbreakExtinguished { day });
        } else if self.outbreak_started {
            self.phase = Phase::Active;
        } else {
            self.phase = Phase::PreOutbreak;
        }
    }

    fn check_conservation(&self) -> Result<(), SimulationError> {
        if !self.state.conserves(self.scenario.population) {
            return Err(SimulationError::ConservationViolation {
                day: self.state.day(),
                expected: self.scenario.population,
                actual: self.state.total(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Capture the engine state for later restore.
    ///
    /// The snapshot carries the RNG state word and a fingerprint of the
    /// scenario; the event log is not part of snapshots.
    pub fn snapshot(&self) -> Result<EngineSnapshot, SimulationError> {
        Ok(EngineSnapshot {
            state: self.state.clone(),
            phase: self.phase,
            outbreak_started: self.outbreak_started,
            vaccine_available: self.vaccine_available,
            total_infections: self.total_infections,
            last_step_costs: self.last_step_costs,
            costs: self.costs,
            rng_state: self.rng.get_state(),
            scenario_hash: compute_scenario_hash(&self.scenario)?,
        })
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// The scenario must be the one the snapshot was taken under; the
    /// fingerprint check rejects everything else. A restored engine
    /// continues bit-identically to the engine the snapshot came from,
    /// with an empty event log.
    pub fn restore(scenario: Scenario, snapshot: &EngineSnapshot) -> Result<Self, SimulationError> {
        scenario.validate()?;

        let expected = compute_scenario_hash(&scenario)?;
        if expected != snapshot.scenario_hash {
            return Err(SimulationError::SnapshotMismatch {
                expected,
                actual: snapshot.scenario_hash.clone(),
            });
        }

        if !snapshot.state.conserves(scenario.population) {
            return Err(SimulationError::StateValidationError(format!(
                "snapshot compartments sum to {}, population is {}",
                snapshot.state.total(),
                scenario.population
            )));
        }

        Ok(Self {
            state: snapshot.state.clone(),
            rng: RngManager::from_state(snapshot.rng_state),
            phase: snapshot.phase,
            outbreak_started: snapshot.outbreak_started,
            vaccine_available: snapshot.vaccine_available,
            total_infections: snapshot.total_infections,
            last_step_costs: snapshot.last_step_costs,
            costs: snapshot.costs,
            event_log: EventLog::new(),
            scenario,
        })
    }
}
