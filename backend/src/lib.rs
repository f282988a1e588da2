//! Epidemic Simulator Core - Rust Engine
//!
//! Day-stepped stochastic compartment model of an epidemic under policy
//! control, with deterministic execution.
//!
//! # Architecture
//!
//! - **models**: Domain types (Scenario, EpidemicState, Observables, events)
//! - **engine**: The step machine, cost accounting, and checkpointing
//! - **env**: Episodic control-loop wrapper over the engine
//! - **rng**: Deterministic random number generation and sampling
//!
//! # Critical Invariants
//!
//! 1. Compartment counts are u64 people and always sum to the scenario
//!    population
//! 2. All randomness is deterministic (seeded RNG); same scenario + seed
//!    replays the same trajectory
//! 3. FFI boundary is minimal and safe
//!
//! # Example
//!
//! ```rust
//! use epidemic_simulator_core_rs::{
//!     InterventionInput, Scenario, SimulationEngine,
//! };
//!
//! let scenario = Scenario::with_outbreak(1_000_000, 10, 410, 1000);
//! let mut engine = SimulationEngine::new(scenario, 42).unwrap();
//! while !engine.finished() {
//!     engine.step(InterventionInput::none()).unwrap();
//! }
//! let last = engine.observe();
//! assert!(last.finished);
//! assert_eq!(
//!     last.susceptible + last.exposed + last.infected + last.critical
//!         + last.recovered + last.dead + last.vaccinated,
//!     last.population,
//! );
//! ```

// Module declarations
pub mod engine;
pub mod env;
pub mod models;
pub mod rng;

// Re-exports for convenience
pub use engine::{
    CostAccumulator, CostBreakdown, CostRates, EngineSnapshot, Phase, SimulationEngine,
    SimulationError,
};
pub use env::{EpidemicEnv, StepOutcome, NUM_ACTIONS, NUM_OBSERVATIONS};
pub use models::{
    disease::{DiseaseParams, InterventionEffects},
    event::{Event, EventLog},
    intervention::InterventionInput,
    observables::Observables,
    scenario::{OutbreakSchedule, SamplerConfig, Scenario, ScenarioError, ScenarioSampler},
    state::{DailyFlows, EpidemicState},
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn epidemic_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::engine::PyEpiModel>()?;
    m.add_class::<ffi::env::PyEpiEnv>()?;
    Ok(())
}
