//! Outbreak Dynamics Tests
//!
//! Reference scenario: one million people, one index case seeded at day 10,
//! vaccine at day 410, hard horizon at day 1000, no interventions ever.
//!
//! Critical invariants tested:
//! - Nobody is infectious until strictly after the seeding day
//! - Compartments sum to the population on every single day
//! - Dead, recovered, and vaccinated counts never decrease
//! - Every run terminates by the horizon

use epidemic_simulator_core_rs::{
    InterventionInput, Observables, Scenario, SimulationEngine,
};

const POPULATION: u64 = 1_000_000;
const OUTBREAK_DAY: u32 = 10;
const MAX_DAY: u32 = 1_000;

fn reference_scenario() -> Scenario {
    Scenario::with_outbreak(POPULATION, OUTBREAK_DAY, 410, MAX_DAY)
}

/// Run the reference scenario to termination, returning every day's
/// observables in order.
fn run_reference(seed: u64) -> Vec<Observables> {
    let mut engine = SimulationEngine::new(reference_scenario(), seed).unwrap();
    let mut days = Vec::new();
    for _ in 0..=MAX_DAY {
        if engine.finished() {
            break;
        }
        engine.step(InterventionInput::none()).expect("step failed");
        days.push(engine.observe());
    }
    assert!(engine.finished(), "run exceeded the horizon");
    days
}

#[test]
fn test_nobody_infectious_through_seeding_day() {
    for seed in [1, 2, 3, 42] {
        // days[i] holds day i + 1; days 1 through 9 precede the outbreak.
        let days = run_reference(seed);
        for obs in days.iter().take(OUTBREAK_DAY as usize - 1) {
            assert_eq!(obs.infected, 0, "seed {}: infectious before day 10", seed);
            assert_eq!(obs.exposed, 0, "seed {}: exposed before day 10", seed);
        }

        // Day 10 itself: index case seeded into exposed, nothing further.
        let seeding_day = &days[OUTBREAK_DAY as usize - 1];
        assert_eq!(seeding_day.day, OUTBREAK_DAY);
        assert_eq!(seeding_day.exposed, 1);
        assert_eq!(seeding_day.infected, 0);
        assert_eq!(seeding_day.dead, 0, "seed {}: deaths by day 10", seed);
    }
}

#[test]
fn test_infections_rise_strictly_after_seeding_day() {
    // An individual seed dies out before spreading in a few percent of
    // runs, so the takeoff claim is checked across a batch of seeds.
    let mut takeoffs = 0;
    for seed in 1..=20u64 {
        let days = run_reference(seed);

        let first_infectious_day = days.iter().find(|obs| obs.infected > 0).map(|obs| obs.day);
        if let Some(day) = first_infectious_day {
            assert!(
                day > OUTBREAK_DAY,
                "seed {}: infectious at day {} (seeding day is {})",
                seed,
                day,
                OUTBREAK_DAY
            );
        }

        let peak_infected = days.iter().map(|obs| obs.infected).max().unwrap();
        if peak_infected > 1_000 {
            takeoffs += 1;
        }
    }
    assert!(
        takeoffs >= 8,
        "only {} of 20 seeds took off; expected roughly two thirds",
        takeoffs
    );
}

#[test]
fn test_population_conserved_every_day() {
    for seed in [7, 99] {
        for obs in run_reference(seed) {
            let total = obs.susceptible
                + obs.exposed
                + obs.infected
                + obs.critical
                + obs.recovered
                + obs.dead
                + obs.vaccinated;
            assert_eq!(
                total, POPULATION,
                "seed {}: compartments sum to {} on day {}",
                seed, total, obs.day
            );
        }
    }
}

#[test]
fn test_monotone_compartments_never_shrink() {
    let days = run_reference(42);
    for pair in days.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        assert!(next.dead >= prev.dead, "dead shrank on day {}", next.day);
        assert!(
            next.recovered >= prev.recovered,
            "recovered shrank on day {}",
            next.day
        );
        assert!(
            next.vaccinated >= prev.vaccinated,
            "vaccinated shrank on day {}",
            next.day
        );
    }
}

#[test]
fn test_run_terminates_by_horizon() {
    for seed in [5, 6, 8] {
        let days = run_reference(seed);
        let last = days.last().unwrap();
        assert!(last.finished);
        assert!(last.day <= MAX_DAY, "seed {}: ran past the horizon", seed);
    }
}

#[test]
fn test_total_infections_bounded_and_consistent() {
    for seed in [11, 12] {
        let mut engine = SimulationEngine::new(reference_scenario(), seed).unwrap();
        while !engine.finished() {
            engine.step(InterventionInput::none()).unwrap();
        }

        let obs = engine.observe();
        let total = engine.total_infections();
        assert!(total <= POPULATION, "seed {}: more infections than people", seed);
        assert!(
            total >= obs.recovered + obs.dead,
            "seed {}: {} resolved cases but only {} infections",
            seed,
            obs.recovered + obs.dead,
            total
        );
    }
}

#[test]
fn test_vaccine_unlocks_if_run_reaches_day_410() {
    for seed in 1..=10u64 {
        let mut engine = SimulationEngine::new(reference_scenario(), seed).unwrap();
        while !engine.finished() {
            engine.step(InterventionInput::none()).unwrap();
        }

        if engine.day() >= 410 {
            assert!(engine.vaccine_available(), "seed {}: vaccine never unlocked", seed);
            let unlocks = engine.event_log().events_of_type("vaccine_available");
            assert_eq!(unlocks.len(), 1);
            assert_eq!(unlocks[0].day(), 410);
        } else {
            assert!(!engine.vaccine_available());
        }
    }
}
