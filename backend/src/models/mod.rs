//! Domain models for the epidemic simulator

pub mod disease;
pub mod event;
pub mod intervention;
pub mod observables;
pub mod scenario;
pub mod state;

// Re-exports
pub use disease::{DiseaseParams, InterventionEffects};
pub use event::{Event, EventLog};
pub use intervention::InterventionInput;
pub use observables::Observables;
pub use scenario::{
    OutbreakSchedule, SamplerConfig, Scenario, ScenarioError, ScenarioSampler,
};
pub use state::{DailyFlows, EpidemicState};
