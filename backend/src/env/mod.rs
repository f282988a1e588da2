//! Gym-style environment wrapper around the simulation engine.
//!
//! `EpidemicEnv` packages scenario sampling, engine seeding and action
//! decoding behind the usual `reset`/`step` pair so a control loop on the
//! other side of the FFI never touches engine internals. One environment
//! seed fixes the entire stream of episodes.
//!
//! # Critical Invariants
//!
//! 1. Observation ratios use the static scenario population, never the
//!    live compartment sum
//! 2. Reward is exactly the negative of the step cost
//! 3. Same environment seed = same episode stream, bit for bit

use crate::engine::{SimulationEngine, SimulationError};
use crate::models::intervention::InterventionInput;
use crate::models::observables::Observables;
use crate::models::scenario::{SamplerConfig, ScenarioSampler};
use crate::rng::RngManager;

/// Number of entries in the observation vector.
pub const NUM_OBSERVATIONS: usize = 5;

/// Number of discrete actions (all subsets of the three flags).
pub const NUM_ACTIONS: u8 = 8;

/// Everything a step hands back to the control loop.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Observation vector, fixed order: susceptible ratio, infected
    /// ratio, dead ratio, critical-per-bed, vaccine availability.
    pub observation: [f64; NUM_OBSERVATIONS],

    /// Negative of the step cost.
    pub reward: f64,

    /// Whether the episode finished with this step.
    pub done: bool,

    /// Full engine snapshot behind the observation.
    pub observables: Observables,
}

/// Episodic environment: sample a scenario, run it to termination, reset.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::env::EpidemicEnv;
/// use epidemic_simulator_core_rs::SamplerConfig;
///
/// let mut env = EpidemicEnv::new(SamplerConfig::default(), 42).unwrap();
/// let mut observation = env.reset().unwrap();
///
/// for _ in 0..100 {
///     let outcome = env.step(0).unwrap();
///     observation = outcome.observation;
///     if outcome.done {
///         observation = env.reset().unwrap();
///     }
/// }
/// assert!(observation[0] <= 1.0);
/// ```
pub struct EpidemicEnv {
    sampler: ScenarioSampler,
    rng: RngManager,
    engine: SimulationEngine,
}

impl EpidemicEnv {
    /// Create an environment and sample its first episode.
    pub fn new(config: SamplerConfig, seed: u64) -> Result<Self, SimulationError> {
        let sampler = ScenarioSampler::new(config)?;
        let mut rng = RngManager::new(seed);
        let engine = Self::fresh_engine(&sampler, &mut rng)?;
        Ok(Self {
            sampler,
            rng,
            engine,
        })
    }

    /// Sample a fresh scenario and engine seed. Draw order (scenario
    /// first, then seed) is part of the reproducibility contract.
    fn fresh_engine(
        sampler: &ScenarioSampler,
        rng: &mut RngManager,
    ) -> Result<SimulationEngine, SimulationError> {
        let scenario = sampler.sample(rng);
        let engine_seed = rng.next();
        SimulationEngine::new(scenario, engine_seed)
    }

    /// Discard the current episode and start a fresh one.
    ///
    /// Returns the initial observation of the new episode.
    pub fn reset(&mut self) -> Result<[f64; NUM_OBSERVATIONS], SimulationError> {
        self.engine = Self::fresh_engine(&self.sampler, &mut self.rng)?;
        Ok(self.observation())
    }

    /// Advance the current episode by one day.
    ///
    /// Stepping a finished episode is benign (the engine freezes) but
    /// pointless; callers should `reset` once `done` comes back true.
    ///
    /// # Panics
    ///
    /// Panics if `action >= NUM_ACTIONS`.
    pub fn step(&mut self, action: u8) -> Result<StepOutcome, SimulationError> {
        assert!(
            action < NUM_ACTIONS,
            "action index {} out of range (< {})",
            action,
            NUM_ACTIONS
        );

        let input = InterventionInput::from_action_index(action);
        self.engine.step(input)?;

        let observables = self.engine.observe();
        Ok(StepOutcome {
            observation: Self::observation_from(&observables),
            reward: -observables.step_cost,
            done: observables.finished,
            observables,
        })
    }

    /// Observation vector for the current state.
    pub fn observation(&self) -> [f64; NUM_OBSERVATIONS] {
        Self::observation_from(&self.engine.observe())
    }

    /// The engine running the current episode.
    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// The configured episode distribution.
    pub fn sampler(&self) -> &ScenarioSampler {
        &self.sampler
    }

    fn observation_from(obs: &Observables) -> [f64; NUM_OBSERVATIONS] {
        // Ratios against the static population: the denominator never
        // drifts as people die, so observation channels stay comparable
        // across the whole episode.
        let population = obs.population as f64;
        [
            obs.susceptible as f64 / population,
            obs.infected as f64 / population,
            obs.dead as f64 / population,
            obs.critical as f64 / obs.hospital_capacity as f64,
            if obs.vaccine_available { 1.0 } else { 0.0 },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SamplerConfig {
        // Small, fast episodes for unit tests.
        SamplerConfig {
            population: 10_000,
            hospital_capacity: 10,
            daily_vaccinations: 50,
            outbreak_day_range: (0, 10),
            vaccine_lag_range: (20, 40),
            no_outbreak_max_day: 50,
            outbreak_max_day: 120,
            ..SamplerConfig::default()
        }
    }

    #[test]
    fn test_initial_observation_is_all_susceptible() {
        let mut env = EpidemicEnv::new(test_config(), 42).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs[0], 1.0, "everyone susceptible at day 0");
        assert_eq!(obs[1], 0.0);
        assert_eq!(obs[2], 0.0);
        assert_eq!(obs[3], 0.0);
        assert_eq!(obs[4], 0.0);
    }

    #[test]
    fn test_observation_ratios_use_static_population() {
        let mut env = EpidemicEnv::new(test_config(), 7).unwrap();
        for _ in 0..60 {
            let outcome = env.step(0).unwrap();
            let obs = outcome.observation;
            assert!((0.0..=1.0).contains(&obs[0]), "susceptible ratio in range");
            assert!((0.0..=1.0).contains(&obs[1]), "infected ratio in range");
            assert!((0.0..=1.0).contains(&obs[2]), "dead ratio in range");
            assert!(obs[3] >= 0.0);
            assert!(obs[4] == 0.0 || obs[4] == 1.0);

            let o = &outcome.observables;
            let expected = o.susceptible as f64 / o.population as f64;
            assert_eq!(obs[0], expected, "denominator must be the static population");
            if outcome.done {
                break;
            }
        }
    }

    #[test]
    fn test_reward_is_negative_step_cost() {
        let mut env = EpidemicEnv::new(test_config(), 11).unwrap();
        for _ in 0..30 {
            let outcome = env.step(0b111).unwrap();
            assert_eq!(outcome.reward, -outcome.observables.step_cost);
            assert!(outcome.reward <= 0.0, "costs can only be nonpositive rewards");
            if outcome.done {
                break;
            }
        }
    }

    #[test]
    fn test_episode_reaches_done() {
        let mut env = EpidemicEnv::new(test_config(), 3).unwrap();
        let mut done = false;
        for _ in 0..200 {
            if env.step(0).unwrap().done {
                done = true;
                break;
            }
        }
        assert!(done, "every sampled episode terminates within its horizon");
    }

    #[test]
    fn test_reset_starts_fresh_episode() {
        let mut env = EpidemicEnv::new(test_config(), 5).unwrap();
        while !env.step(0).unwrap().done {}
        let obs = env.reset().unwrap();
        assert_eq!(env.engine().day(), 0);
        assert_eq!(obs[0], 1.0);
        assert_eq!(obs[2], 0.0);
    }

    #[test]
    fn test_same_seed_same_episode_stream() {
        let mut env1 = EpidemicEnv::new(test_config(), 12345).unwrap();
        let mut env2 = EpidemicEnv::new(test_config(), 12345).unwrap();

        for episode in 0..3 {
            assert_eq!(env1.reset().unwrap(), env2.reset().unwrap());
            assert_eq!(
                env1.engine().scenario(),
                env2.engine().scenario(),
                "episode {} sampled different scenarios",
                episode
            );
            for _ in 0..50 {
                let o1 = env1.step(2).unwrap();
                let o2 = env2.step(2).unwrap();
                assert_eq!(o1, o2);
                if o1.done {
                    break;
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_step_rejects_out_of_range_action() {
        let mut env = EpidemicEnv::new(test_config(), 1).unwrap();
        let _ = env.step(8);
    }
}
