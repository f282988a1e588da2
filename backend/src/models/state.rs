//! Compartmental population state and the daily flows that move it.
//!
//! The population is partitioned into seven disjoint compartments. All
//! transitions happen through [`EpidemicState::apply_flows`], which debits
//! every source compartment before crediting any destination, so a
//! conservation breach is caught at the exact flow that caused it.
//!
//! # Critical Invariants
//!
//! 1. Compartment totals always sum to the scenario population
//! 2. `dead` and `vaccinated` are absorbing: no flow ever leaves them
//! 3. Flows are applied at most once per simulated day

use serde::{Deserialize, Serialize};

/// One day's worth of compartment transitions, computed from the
/// pre-update state and applied atomically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFlows {
    /// Susceptible who picked up the infection (S -> E).
    pub new_exposed: u64,
    /// Exposed whose incubation completed (E -> I).
    pub new_infected: u64,
    /// Infected who recovered without escalation (I -> R).
    pub infected_recoveries: u64,
    /// Infected who escalated to critical care (I -> C).
    pub new_critical: u64,
    /// Critical cases who recovered (C -> R).
    pub critical_recoveries: u64,
    /// Critical cases who died (C -> D).
    pub new_deaths: u64,
    /// Susceptible vaccinated this day (S -> V).
    pub new_vaccinated: u64,
}

impl DailyFlows {
    /// Flows of a day in which nothing happened.
    pub const NONE: DailyFlows = DailyFlows {
        new_exposed: 0,
        new_infected: 0,
        infected_recoveries: 0,
        new_critical: 0,
        critical_recoveries: 0,
        new_deaths: 0,
        new_vaccinated: 0,
    };

    /// Whether any compartment moves at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// Population partition at a point in time.
///
/// Fields are private; the engine mutates the state exclusively through
/// the `pub(crate)` methods below, each of which asserts its precondition
/// before touching anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpidemicState {
    susceptible: u64,
    exposed: u64,
    infected: u64,
    critical: u64,
    recovered: u64,
    dead: u64,
    vaccinated: u64,
    day: u32,
}

impl EpidemicState {
    /// Fresh state at day 0 with the entire population susceptible.
    pub fn new(population: u64) -> Self {
        Self {
            susceptible: population,
            exposed: 0,
            infected: 0,
            critical: 0,
            recovered: 0,
            dead: 0,
            vaccinated: 0,
            day: 0,
        }
    }

    /// People never infected and not yet vaccinated.
    pub fn susceptible(&self) -> u64 {
        self.susceptible
    }

    /// Infected but not yet infectious.
    pub fn exposed(&self) -> u64 {
        self.exposed
    }

    /// Infectious cases.
    pub fn infected(&self) -> u64 {
        self.infected
    }

    /// Cases needing critical care.
    pub fn critical(&self) -> u64 {
        self.critical
    }

    /// Recovered and immune.
    pub fn recovered(&self) -> u64 {
        self.recovered
    }

    /// Cumulative deaths.
    pub fn dead(&self) -> u64 {
        self.dead
    }

    /// Vaccinated directly out of the susceptible pool.
    pub fn vaccinated(&self) -> u64 {
        self.vaccinated
    }

    /// Current simulated day.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Everyone currently carrying the disease (E + I + C). The epidemic
    /// is extinguished exactly when this reaches zero after seeding.
    pub fn active_infections(&self) -> u64 {
        self.exposed + self.infected + self.critical
    }

    /// Sum over all seven compartments.
    pub fn total(&self) -> u64 {
        self.susceptible
            + self.exposed
            + self.infected
            + self.critical
            + self.recovered
            + self.dead
            + self.vaccinated
    }

    /// Whether the partition still accounts for the full population.
    pub fn conserves(&self, population: u64) -> bool {
        self.total() == population
    }

    /// Advance the day counter by one.
    pub(crate) fn advance_day(&mut self) {
        self.day += 1;
    }

    /// Seed the outbreak by moving index cases into the exposed
    /// compartment; they become infectious as their incubation completes.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `index_cases` people are susceptible.
    pub(crate) fn seed_infections(&mut self, index_cases: u64) {
        assert!(
            index_cases <= self.susceptible,
            "cannot seed {} index cases from {} susceptible",
            index_cases,
            self.susceptible
        );
        self.susceptible -= index_cases;
        self.exposed += index_cases;
    }

    /// Apply one day of transitions. Every source compartment is debited
    /// before any destination is credited.
    ///
    /// # Panics
    ///
    /// Panics if any flow exceeds the compartment it drains.
    pub(crate) fn apply_flows(&mut self, flows: &DailyFlows) {
        assert!(
            flows.new_exposed + flows.new_vaccinated <= self.susceptible,
            "flows drain susceptible below zero: {} exposed + {} vaccinated > {}",
            flows.new_exposed,
            flows.new_vaccinated,
            self.susceptible
        );
        assert!(
            flows.new_infected <= self.exposed,
            "flows drain exposed below zero: {} > {}",
            flows.new_infected,
            self.exposed
        );
        assert!(
            flows.infected_recoveries + flows.new_critical <= self.infected,
            "flows drain infected below zero: {} recoveries + {} critical > {}",
            flows.infected_recoveries,
            flows.new_critical,
            self.infected
        );
        assert!(
            flows.critical_recoveries + flows.new_deaths <= self.critical,
            "flows drain critical below zero: {} recoveries + {} deaths > {}",
            flows.critical_recoveries,
            flows.new_deaths,
            self.critical
        );

        self.susceptible -= flows.new_exposed + flows.new_vaccinated;
        self.exposed -= flows.new_infected;
        self.infected -= flows.infected_recoveries + flows.new_critical;
        self.critical -= flows.critical_recoveries + flows.new_deaths;

        self.exposed += flows.new_exposed;
        self.infected += flows.new_infected;
        self.critical += flows.new_critical;
        self.recovered += flows.infected_recoveries + flows.critical_recoveries;
        self.dead += flows.new_deaths;
        self.vaccinated += flows.new_vaccinated;
    }
}
