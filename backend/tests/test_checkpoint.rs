//! Checkpoint Tests
//!
//! A snapshot must be enough to continue a run bit-identically: same
//! compartment counts, same costs, same randomness, day by day. The
//! scenario is not embedded in the snapshot, so restore verifies a
//! fingerprint and rejects snapshots taken under any other scenario.
//!
//! Critical invariants tested:
//! - Restored engines produce the exact trajectory of the original
//! - Snapshots are refused under a different or invalid scenario
//! - Tampered compartment counts are caught at restore
//! - The event log never travels with a snapshot

use epidemic_simulator_core_rs::{
    EngineSnapshot, InterventionInput, OutbreakSchedule, Scenario, SimulationEngine,
    SimulationError,
};

fn checkpoint_scenario() -> Scenario {
    let mut scenario = Scenario::with_outbreak(100_000, 5, 40, 300);
    scenario.schedule = OutbreakSchedule::Outbreak {
        outbreak_day: 5,
        vaccine_day: 40,
        max_day: 300,
        index_cases: 50,
    };
    scenario
}

/// Rotate through the action space so snapshots land under varied inputs.
fn input_for_day(day: u32) -> InterventionInput {
    InterventionInput::from_action_index((day % 8) as u8)
}

// ============================================================================
// Snapshot contents
// ============================================================================

#[test]
fn test_snapshot_json_exposes_required_fields() {
    let mut engine = SimulationEngine::new(checkpoint_scenario(), 42).unwrap();
    for day in 1..=20 {
        engine.step(input_for_day(day)).unwrap();
    }

    let json = engine.snapshot().unwrap().to_json().unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&json).expect("snapshot must be valid JSON");

    for field in [
        "state",
        "phase",
        "outbreak_started",
        "vaccine_available",
        "total_infections",
        "last_step_costs",
        "costs",
        "rng_state",
        "scenario_hash",
    ] {
        assert!(value.get(field).is_some(), "snapshot missing `{}`", field);
    }
    assert_eq!(value["state"]["day"], 20);
    assert!(value["state"]["susceptible"].is_u64());
    assert!(value["scenario_hash"].is_string());
}

// ============================================================================
// Bit-identical continuation
// ============================================================================

#[test]
fn test_restore_continues_bit_identically() {
    for seed in [1u64, 42, 7_777_777] {
        let mut original = SimulationEngine::new(checkpoint_scenario(), seed).unwrap();
        for day in 1..=50 {
            original.step(input_for_day(day)).unwrap();
        }

        let json = original.snapshot().unwrap().to_json().unwrap();
        let snapshot = EngineSnapshot::from_json(&json).unwrap();
        let mut restored =
            SimulationEngine::restore(checkpoint_scenario(), &snapshot).unwrap();

        assert_eq!(restored.observe(), original.observe(), "seed {}", seed);

        for day in 51..=100 {
            let input = input_for_day(day);
            original.step(input).unwrap();
            restored.step(input).unwrap();
            assert_eq!(
                restored.observe(),
                original.observe(),
                "seed {} diverged on day {}",
                seed,
                day
            );
        }
    }
}

#[test]
fn test_snapshot_during_pre_outbreak_restores() {
    let mut original = SimulationEngine::new(checkpoint_scenario(), 5).unwrap();
    original.step(InterventionInput::none()).unwrap();
    original.step(InterventionInput::none()).unwrap();

    let snapshot = original.snapshot().unwrap();
    let mut restored = SimulationEngine::restore(checkpoint_scenario(), &snapshot).unwrap();

    // Carry both through seeding and into the outbreak.
    for _ in 0..20 {
        original.step(InterventionInput::none()).unwrap();
        restored.step(InterventionInput::none()).unwrap();
        assert_eq!(restored.observe(), original.observe());
    }
    assert!(original.total_infections() > 0);
}

// ============================================================================
// Rejection paths
// ============================================================================

#[test]
fn test_restore_rejects_different_scenario() {
    let mut engine = SimulationEngine::new(checkpoint_scenario(), 42).unwrap();
    for day in 1..=10 {
        engine.step(input_for_day(day)).unwrap();
    }
    let snapshot = engine.snapshot().unwrap();

    let mut other = checkpoint_scenario();
    other.population = 50_000;
    let result = SimulationEngine::restore(other, &snapshot);
    assert!(matches!(
        result,
        Err(SimulationError::SnapshotMismatch { .. })
    ));
}

#[test]
fn test_restore_rejects_invalid_scenario() {
    let engine = SimulationEngine::new(checkpoint_scenario(), 42).unwrap();
    let snapshot = engine.snapshot().unwrap();

    let invalid = Scenario::with_outbreak(100_000, 100, 50, 300);
    let result = SimulationEngine::restore(invalid, &snapshot);
    assert!(matches!(
        result,
        Err(SimulationError::InvalidScenario(_))
    ));
}

#[test]
fn test_restore_rejects_tampered_state() {
    let mut engine = SimulationEngine::new(checkpoint_scenario(), 42).unwrap();
    for day in 1..=10 {
        engine.step(input_for_day(day)).unwrap();
    }
    let json = engine.snapshot().unwrap().to_json().unwrap();

    // Inflate the susceptible count so the compartments no longer sum to
    // the population.
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let susceptible = value["state"]["susceptible"].as_u64().unwrap();
    value["state"]["susceptible"] = serde_json::json!(susceptible + 1_000);

    let tampered = EngineSnapshot::from_json(&value.to_string()).unwrap();
    let result = SimulationEngine::restore(checkpoint_scenario(), &tampered);
    assert!(matches!(
        result,
        Err(SimulationError::StateValidationError(_))
    ));
}

#[test]
fn test_corrupted_snapshot_json_rejected() {
    for garbage in ["", "{", "{\"state\": 12}", "[1, 2, 3]"] {
        assert!(
            matches!(
                EngineSnapshot::from_json(garbage),
                Err(SimulationError::SerializationError(_))
            ),
            "accepted {:?}",
            garbage
        );
    }
}

// ============================================================================
// Event log semantics
// ============================================================================

#[test]
fn test_event_log_does_not_travel_with_snapshots() {
    let mut original = SimulationEngine::new(checkpoint_scenario(), 42).unwrap();
    for day in 1..=10 {
        original.step(input_for_day(day)).unwrap();
    }
    assert!(
        !original.event_log().events().is_empty(),
        "seeding should have logged an event"
    );

    let snapshot = original.snapshot().unwrap();
    let restored = SimulationEngine::restore(checkpoint_scenario(), &snapshot).unwrap();

    assert_eq!(restored.event_log().len(), 0);
    assert!(!original.event_log().events().is_empty());
}
