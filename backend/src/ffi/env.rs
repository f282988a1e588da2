//! Python FFI bindings for the episodic environment
//!
//! Exposes `EpidemicEnv` to Python as the `EpiEnv` class with the usual
//! episodic control surface: `reset()` returning an observation vector
//! and `step(action)` returning an (observation, reward, done, info)
//! tuple.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::env::{EpidemicEnv, NUM_ACTIONS, NUM_OBSERVATIONS};
use crate::ffi::types::{observables_to_py, parse_sampler_config, scenario_to_py};
use crate::models::SamplerConfig;

/// Python wrapper for the episodic environment.
///
/// Each episode runs one sampled scenario to termination. The env seed
/// fixes the whole episode stream: scenario draws and engine seeds come
/// from one generator, so the same seed replays the same episodes.
#[pyclass(name = "EpiEnv")]
pub struct PyEpiEnv {
    env: EpidemicEnv,
}

#[pymethods]
impl PyEpiEnv {
    /// Observation vector length.
    #[classattr]
    const N_OBSERVATIONS: usize = NUM_OBSERVATIONS;

    /// Number of discrete actions (intervention bitmasks).
    #[classattr]
    const N_ACTIONS: u8 = NUM_ACTIONS;

    /// Create a new environment.
    ///
    /// # Arguments
    /// * `config` - optional sampler config dict; defaults apply when omitted
    /// * `seed` - seed for the episode stream
    ///
    /// # Errors
    /// Returns PyValueError if the config dict is malformed or fails
    /// validation.
    #[staticmethod]
    #[pyo3(signature = (config = None, seed = 0))]
    fn new(config: Option<&Bound<'_, PyDict>>, seed: u64) -> PyResult<Self> {
        let sampler_config = match config {
            Some(dict) => parse_sampler_config(dict)?,
            None => SamplerConfig::default(),
        };
        let env = EpidemicEnv::new(sampler_config, seed).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Failed to create environment: {}", e))
        })?;
        Ok(PyEpiEnv { env })
    }

    /// Start a new episode with a freshly sampled scenario.
    ///
    /// Returns the initial observation vector.
    fn reset(&mut self) -> PyResult<Vec<f64>> {
        self.env
            .reset()
            .map(|obs| obs.to_vec())
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Reset failed: {}", e)))
    }

    /// Advance the episode by one day.
    ///
    /// Returns `(observation, reward, done, info)` where info is the full
    /// observables dict for the new day. Stepping a finished episode is a
    /// no-op that repeats the terminal outcome; call `reset` instead.
    fn step(&mut self, py: Python, action: u8) -> PyResult<(Vec<f64>, f64, bool, Py<PyDict>)> {
        if action >= NUM_ACTIONS {
            return Err(PyErr::new::<PyValueError, _>(format!(
                "Action {} out of range (expected 0..{})",
                action, NUM_ACTIONS
            )));
        }
        let outcome = self
            .env
            .step(action)
            .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Step failed: {}", e)))?;
        let info = observables_to_py(py, &outcome.observables)?;
        Ok((outcome.observation.to_vec(), outcome.reward, outcome.done, info))
    }

    /// Current observation without stepping.
    fn observation(&self) -> Vec<f64> {
        self.env.observation().to_vec()
    }

    /// Current simulation day within the running episode.
    fn day(&self) -> u32 {
        self.env.engine().day()
    }

    /// Whether the current episode has ended.
    fn finished(&self) -> bool {
        self.env.engine().finished()
    }

    /// The scenario of the current episode, as a dict.
    fn scenario(&self, py: Python) -> PyResult<Py<PyDict>> {
        scenario_to_py(py, self.env.engine().scenario())
    }
}
