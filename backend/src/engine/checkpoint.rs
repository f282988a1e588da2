//! Checkpoint: save and restore engine state.
//!
//! A snapshot captures everything `SimulationEngine::restore` needs to
//! continue a run bit-identically: the compartmental state, the lifecycle
//! flags, the cost records and the RNG state word. The scenario itself is
//! not embedded; a SHA-256 fingerprint of its canonical JSON is, and the
//! restore path refuses snapshots taken under a different scenario.
//!
//! # Critical Invariants
//!
//! 1. Restore with the original scenario continues bit-identically
//! 2. Restore with any other scenario is rejected, never coerced
//! 3. Snapshots are plain data: serializable, inspectable, diffable

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::costs::{CostAccumulator, CostBreakdown};
use crate::engine::simulation::{Phase, SimulationError};
use crate::models::state::EpidemicState;

/// Complete engine state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Compartment counts and the day counter.
    pub state: EpidemicState,

    /// Lifecycle phase at snapshot time.
    pub phase: Phase,

    /// Whether index cases had been seeded.
    pub outbreak_started: bool,

    /// Whether the vaccine had unlocked.
    pub vaccine_available: bool,

    /// Cumulative count of everyone who ever entered the exposed
    /// compartment.
    pub total_infections: u64,

    /// Cost of the step preceding the snapshot.
    pub last_step_costs: CostBreakdown,

    /// Running cost totals.
    pub costs: CostAccumulator,

    /// RNG state word (CRITICAL for determinism).
    pub rng_state: u64,

    /// SHA-256 fingerprint of the scenario's canonical JSON.
    pub scenario_hash: String,
}

impl EngineSnapshot {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string(self).map_err(|e| {
            SimulationError::SerializationError(format!("snapshot encode failed: {}", e))
        })
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json).map_err(|e| {
            SimulationError::SerializationError(format!("snapshot decode failed: {}", e))
        })
    }
}

/// Compute a deterministic SHA-256 fingerprint of a scenario.
///
/// Serializes to canonical JSON (recursively sorted object keys) first,
/// so the fingerprint does not depend on field or map ordering.
pub fn compute_scenario_hash<T: Serialize>(scenario: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(scenario).map_err(|e| {
        SimulationError::SerializationError(format!("scenario serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("scenario serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
