//! Python FFI bindings for the simulation engine
//!
//! Exposes `SimulationEngine` to Python as the `EpiModel` class. All
//! interaction crosses the boundary as plain dicts, lists, and scalars;
//! no Python object holds Rust state beyond the wrapped engine itself.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::engine::{EngineSnapshot, SimulationEngine};
use crate::env::NUM_ACTIONS;
use crate::ffi::types::{
    events_to_py, observables_to_py, parse_sampler_config, parse_scenario, scenario_to_py,
};
use crate::models::intervention::InterventionInput;
use crate::models::{SamplerConfig, ScenarioSampler};
use crate::rng::RngManager;

/// Python wrapper for the simulation engine.
///
/// Owns one episode: a fixed scenario, the compartment state, the RNG,
/// and the accumulated costs. Stepping past the end of the episode is a
/// no-op, mirroring the Rust API.
#[pyclass(name = "EpiModel")]
pub struct PyEpiModel {
    engine: SimulationEngine,
}

#[pymethods]
impl PyEpiModel {
    /// Create a new engine from a scenario dict and a seed.
    ///
    /// # Arguments
    /// * `config` - Python dict describing the scenario (see `parse_scenario`)
    /// * `seed` - RNG seed; the same (config, seed) pair replays identically
    ///
    /// # Errors
    /// Returns PyValueError if the dict is malformed or the scenario fails
    /// validation.
    #[staticmethod]
    #[pyo3(signature = (config, seed = 0))]
    fn new(config: &Bound<'_, PyDict>, seed: u64) -> PyResult<Self> {
        let scenario = parse_scenario(config)?;
        let engine = SimulationEngine::new(scenario, seed).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Failed to create engine: {}", e))
        })?;
        Ok(PyEpiModel { engine })
    }

    /// Draw one scenario from the episode distribution, as a dict `new`
    /// accepts.
    ///
    /// # Arguments
    /// * `config` - optional sampler config dict; omitted fields use the
    ///   training-distribution defaults
    /// * `seed` - sampling seed; the same (config, seed) pair draws the
    ///   same scenario
    #[staticmethod]
    #[pyo3(signature = (config = None, seed = 0))]
    fn sample(
        py: Python,
        config: Option<&Bound<'_, PyDict>>,
        seed: u64,
    ) -> PyResult<Py<PyDict>> {
        let sampler_config = match config {
            Some(dict) => parse_sampler_config(dict)?,
            None => SamplerConfig::default(),
        };
        let sampler = ScenarioSampler::new(sampler_config).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Invalid sampler config: {}", e))
        })?;
        let mut rng = RngManager::new(seed);
        scenario_to_py(py, &sampler.sample(&mut rng))
    }

    /// Advance the simulation by one day under the given interventions.
    ///
    /// # Errors
    /// Returns PyRuntimeError if an internal invariant is violated.
    #[pyo3(signature = (recommend_distancing = false, isolate_symptomatic = false, isolate_all = false))]
    fn step(
        &mut self,
        recommend_distancing: bool,
        isolate_symptomatic: bool,
        isolate_all: bool,
    ) -> PyResult<()> {
        let input = InterventionInput {
            recommend_distancing,
            isolate_symptomatic,
            isolate_all,
        };
        self.engine
            .step(input)
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Step failed: {}", e)))
    }

    /// Advance by one day with interventions encoded as a bitmask action.
    ///
    /// Bit 0 = recommend distancing, bit 1 = isolate symptomatic,
    /// bit 2 = isolate everyone.
    fn step_action(&mut self, action: u8) -> PyResult<()> {
        if action >= NUM_ACTIONS {
            return Err(PyErr::new::<PyValueError, _>(format!(
                "Action {} out of range (expected 0..{})",
                action, NUM_ACTIONS
            )));
        }
        self.engine
            .step(InterventionInput::from_action_index(action))
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Step failed: {}", e)))
    }

    /// Snapshot of everything observable about the current day.
    fn observe(&self, py: Python) -> PyResult<Py<PyDict>> {
        observables_to_py(py, &self.engine.observe())
    }

    /// Current simulation day (0 before any step).
    fn day(&self) -> u32 {
        self.engine.day()
    }

    /// Whether the episode has ended.
    fn finished(&self) -> bool {
        self.engine.finished()
    }

    /// Lifecycle phase as a string.
    fn phase(&self) -> String {
        self.engine.phase().as_str().to_string()
    }

    /// Whether vaccination is currently running.
    fn vaccine_available(&self) -> bool {
        self.engine.vaccine_available()
    }

    /// Total infections over the episode so far (seeds plus daily exposures).
    fn total_infections(&self) -> u64 {
        self.engine.total_infections()
    }

    /// Cumulative cost over the episode so far.
    fn cumulative_cost(&self) -> f64 {
        self.engine.costs().total()
    }

    /// All notable events logged so far, oldest first.
    fn events(&self, py: Python) -> PyResult<Py<PyList>> {
        events_to_py(py, self.engine.event_log().events())
    }

    /// The scenario this engine runs, as a dict in `new`'s input shape.
    fn scenario(&self, py: Python) -> PyResult<Py<PyDict>> {
        scenario_to_py(py, self.engine.scenario())
    }

    /// Serialize the engine state to a JSON snapshot string.
    ///
    /// The snapshot embeds a scenario fingerprint; restoring requires the
    /// same scenario dict.
    fn snapshot_json(&self) -> PyResult<String> {
        self.engine
            .snapshot()
            .and_then(|snapshot| snapshot.to_json())
            .map_err(|e| {
                PyErr::new::<PyRuntimeError, _>(format!("Snapshot failed: {}", e))
            })
    }

    /// Rebuild an engine from a scenario dict and a snapshot string.
    ///
    /// # Errors
    /// Returns PyValueError if the JSON is malformed or the scenario does
    /// not match the one the snapshot was taken from.
    #[staticmethod]
    fn restore_json(config: &Bound<'_, PyDict>, snapshot_json: &str) -> PyResult<Self> {
        let scenario = parse_scenario(config)?;
        let snapshot = EngineSnapshot::from_json(snapshot_json).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Invalid snapshot: {}", e))
        })?;
        let engine = SimulationEngine::restore(scenario, &snapshot).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Restore failed: {}", e))
        })?;
        Ok(PyEpiModel { engine })
    }
}
