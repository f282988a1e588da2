//! Simulation engine: step machine, cost model, checkpointing.
//!
//! See `simulation.rs` for the step machine implementation.

pub mod checkpoint;
pub mod costs;
pub mod simulation;

// Re-export main types for convenience
pub use costs::{CostAccumulator, CostBreakdown, CostRates};
pub use simulation::{Phase, SimulationEngine, SimulationError};

// Re-export checkpoint types
pub use checkpoint::{compute_scenario_hash, EngineSnapshot};
