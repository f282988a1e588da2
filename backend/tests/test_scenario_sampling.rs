//! Scenario Sampling Tests
//!
//! The sampler feeds the episodic environment, so every scenario it can
//! ever produce must be valid and runnable, and the draw stream must be
//! reproducible per seed.
//!
//! Critical invariants tested:
//! - Every sampled scenario passes validation and boots an engine
//! - Sampled days land inside the configured ranges
//! - The outbreak/no-outbreak branch tracks its configured probability

use epidemic_simulator_core_rs::{
    InterventionInput, RngManager, SamplerConfig, Scenario, ScenarioSampler, SimulationEngine,
};

fn small_config() -> SamplerConfig {
    SamplerConfig {
        population: 10_000,
        hospital_capacity: 20,
        daily_vaccinations: 50,
        outbreak_day_range: (0, 30),
        vaccine_lag_range: (40, 80),
        no_outbreak_max_day: 60,
        outbreak_max_day: 200,
        ..SamplerConfig::default()
    }
}

#[test]
fn test_every_sampled_scenario_is_valid() {
    let sampler = ScenarioSampler::new(SamplerConfig::default()).unwrap();
    let mut rng = RngManager::new(42);

    for i in 0..1_000 {
        let scenario = sampler.sample(&mut rng);
        assert!(
            scenario.validate().is_ok(),
            "draw {} produced an invalid scenario: {:?}",
            i,
            scenario
        );
    }
}

#[test]
fn test_sampled_scenarios_boot_and_run() {
    let sampler = ScenarioSampler::new(small_config()).unwrap();
    let mut rng = RngManager::new(7);

    for i in 0..50 {
        let scenario = sampler.sample(&mut rng);
        let mut engine = SimulationEngine::new(scenario, rng.next())
            .unwrap_or_else(|e| panic!("draw {} rejected by the engine: {}", i, e));
        for _ in 0..30 {
            engine.step(InterventionInput::none()).expect("step failed");
        }
    }
}

#[test]
fn test_branch_frequency_tracks_probability() {
    let sampler = ScenarioSampler::new(SamplerConfig {
        p_no_outbreak: 0.5,
        ..SamplerConfig::default()
    })
    .unwrap();
    let mut rng = RngManager::new(99);

    let draws = 1_000;
    let controls = (0..draws)
        .filter(|_| !sampler.sample(&mut rng).schedule.has_outbreak())
        .count();

    // Binomial(1000, 0.5) has sigma ~ 16; 400..600 is beyond six sigma.
    assert!(
        (400..=600).contains(&controls),
        "{} of {} draws were control episodes, expected about half",
        controls,
        draws
    );
}

#[test]
fn test_sampled_days_within_ranges() {
    let config = small_config();
    let sampler = ScenarioSampler::new(SamplerConfig {
        p_no_outbreak: 0.0,
        ..config.clone()
    })
    .unwrap();
    let mut rng = RngManager::new(11);

    for _ in 0..500 {
        let scenario = sampler.sample(&mut rng);
        let outbreak_day = scenario.schedule.outbreak_day().unwrap();
        let vaccine_day = scenario.schedule.vaccine_day().unwrap();

        assert!(
            outbreak_day >= config.outbreak_day_range.0
                && outbreak_day <= config.outbreak_day_range.1,
            "outbreak day {} outside {:?}",
            outbreak_day,
            config.outbreak_day_range
        );
        let lag = vaccine_day - outbreak_day;
        assert!(
            lag >= config.vaccine_lag_range.0 && lag <= config.vaccine_lag_range.1,
            "vaccine lag {} outside {:?}",
            lag,
            config.vaccine_lag_range
        );
        assert_eq!(scenario.max_day(), config.outbreak_max_day);
    }
}

#[test]
fn test_degenerate_ranges_pin_the_days() {
    let sampler = ScenarioSampler::new(SamplerConfig {
        p_no_outbreak: 0.0,
        outbreak_day_range: (15, 15),
        vaccine_lag_range: (100, 100),
        ..SamplerConfig::default()
    })
    .unwrap();
    let mut rng = RngManager::new(3);

    for _ in 0..100 {
        let scenario = sampler.sample(&mut rng);
        assert_eq!(scenario.schedule.outbreak_day(), Some(15));
        assert_eq!(scenario.schedule.vaccine_day(), Some(115));
    }
}

#[test]
fn test_sampling_reproducible_per_seed() {
    let sampler = ScenarioSampler::new(SamplerConfig::default()).unwrap();

    let draw_sequence = |seed: u64| -> Vec<Scenario> {
        let mut rng = RngManager::new(seed);
        (0..200).map(|_| sampler.sample(&mut rng)).collect()
    };

    assert_eq!(draw_sequence(314), draw_sequence(314));
    assert_ne!(draw_sequence(314), draw_sequence(315));
}

#[test]
fn test_sampler_shares_fixed_fields() {
    let config = small_config();
    let sampler = ScenarioSampler::new(config.clone()).unwrap();
    let mut rng = RngManager::new(21);

    for _ in 0..100 {
        let scenario = sampler.sample(&mut rng);
        assert_eq!(scenario.population, config.population);
        assert_eq!(scenario.hospital_capacity, config.hospital_capacity);
        assert_eq!(scenario.daily_vaccinations, config.daily_vaccinations);
        if scenario.schedule.has_outbreak() {
            assert_eq!(scenario.schedule.index_cases(), config.index_cases);
        }
    }
}
