//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::engine::CostRates;
use crate::models::disease::{DiseaseParams, InterventionEffects};
use crate::models::event::Event;
use crate::models::observables::Observables;
use crate::models::scenario::{
    OutbreakSchedule, SamplerConfig, Scenario, DEFAULT_MAX_DAY,
};

// ========================================================================
// PyDict Extraction Helpers (DRY Pattern)
// ========================================================================

/// Extract a required field from a Python dict with a clear error message.
fn extract_required<'py, T>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| {
            PyErr::new::<PyValueError, _>(format!("Missing required field '{}'", key))
        })?
        .extract()
}

/// Extract a field with a default value if missing.
fn extract_with_default<'py, T>(dict: &Bound<'py, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

/// Fetch a nested dict field, if present.
fn sub_dict<'py>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<Option<Bound<'py, PyDict>>> {
    match dict.get_item(key)? {
        Some(value) => Ok(Some(value.downcast_into()?)),
        None => Ok(None),
    }
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert a Python dict to a Scenario.
///
/// Expected shape:
///
/// ```python
/// {
///     "population": 1_000_000,
///     "schedule": {"type": "outbreak", "outbreak_day": 10,
///                  "vaccine_day": 410, "max_day": 1000, "index_cases": 1},
///     # or: {"type": "no_outbreak", "max_day": 1000}
///     "hospital_capacity": 1000,        # optional
///     "daily_vaccinations": 5000,       # optional
///     "disease": {...},                 # optional overrides
///     "interventions": {...},           # optional overrides
///     "costs": {...},                   # optional overrides
/// }
/// ```
///
/// # Errors
///
/// Returns PyValueError if required fields are missing or conversions
/// fail. Semantic validation (vaccine before outbreak, zero capacity)
/// happens at engine construction.
pub fn parse_scenario(py_config: &Bound<'_, PyDict>) -> PyResult<Scenario> {
    let population: u64 = extract_required(py_config, "population")?;
    let schedule = parse_schedule(py_config)?;

    let disease = match sub_dict(py_config, "disease")? {
        Some(dict) => parse_disease_params(&dict)?,
        None => DiseaseParams::default(),
    };
    let interventions = match sub_dict(py_config, "interventions")? {
        Some(dict) => parse_intervention_effects(&dict)?,
        None => InterventionEffects::default(),
    };
    let costs = match sub_dict(py_config, "costs")? {
        Some(dict) => parse_cost_rates(&dict)?,
        None => CostRates::default(),
    };

    Ok(Scenario {
        schedule,
        population,
        hospital_capacity: extract_with_default(
            py_config,
            "hospital_capacity",
            (population / 1000).max(1),
        )?,
        daily_vaccinations: extract_with_default(py_config, "daily_vaccinations", population / 200)?,
        disease,
        interventions,
        costs,
    })
}

/// Parse the outbreak schedule tagged by its "type" field.
fn parse_schedule(py_config: &Bound<'_, PyDict>) -> PyResult<OutbreakSchedule> {
    let py_schedule = sub_dict(py_config, "schedule")?.ok_or_else(|| {
        PyErr::new::<PyValueError, _>("Missing required field 'schedule'")
    })?;

    let kind: String = extract_required(&py_schedule, "type")?;
    match kind.as_str() {
        "no_outbreak" => Ok(OutbreakSchedule::NoOutbreak {
            max_day: extract_with_default(&py_schedule, "max_day", DEFAULT_MAX_DAY)?,
        }),
        "outbreak" => Ok(OutbreakSchedule::Outbreak {
            outbreak_day: extract_required(&py_schedule, "outbreak_day")?,
            vaccine_day: extract_required(&py_schedule, "vaccine_day")?,
            max_day: extract_with_default(&py_schedule, "max_day", 2000)?,
            index_cases: extract_with_default(&py_schedule, "index_cases", 1)?,
        }),
        other => Err(PyErr::new::<PyValueError, _>(format!(
            "Unknown schedule type '{}' (expected 'no_outbreak' or 'outbreak')",
            other
        ))),
    }
}

/// Convert a Python dict to DiseaseParams (missing fields keep defaults).
pub fn parse_disease_params(py_disease: &Bound<'_, PyDict>) -> PyResult<DiseaseParams> {
    let defaults = DiseaseParams::default();
    Ok(DiseaseParams {
        transmission_rate: extract_with_default(
            py_disease,
            "transmission_rate",
            defaults.transmission_rate,
        )?,
        incubation_rate: extract_with_default(
            py_disease,
            "incubation_rate",
            defaults.incubation_rate,
        )?,
        recovery_rate: extract_with_default(py_disease, "recovery_rate", defaults.recovery_rate)?,
        critical_rate: extract_with_default(py_disease, "critical_rate", defaults.critical_rate)?,
        fatality_rate: extract_with_default(py_disease, "fatality_rate", defaults.fatality_rate)?,
        overflow_fatality_multiplier: extract_with_default(
            py_disease,
            "overflow_fatality_multiplier",
            defaults.overflow_fatality_multiplier,
        )?,
    })
}

/// Convert a Python dict to InterventionEffects (missing fields keep defaults).
pub fn parse_intervention_effects(
    py_effects: &Bound<'_, PyDict>,
) -> PyResult<InterventionEffects> {
    let defaults = InterventionEffects::default();
    Ok(InterventionEffects {
        recommend_multiplier: extract_with_default(
            py_effects,
            "recommend_multiplier",
            defaults.recommend_multiplier,
        )?,
        isolate_symptomatic_multiplier: extract_with_default(
            py_effects,
            "isolate_symptomatic_multiplier",
            defaults.isolate_symptomatic_multiplier,
        )?,
        isolate_all_multiplier: extract_with_default(
            py_effects,
            "isolate_all_multiplier",
            defaults.isolate_all_multiplier,
        )?,
    })
}

/// Convert a Python dict to CostRates (missing fields keep defaults).
pub fn parse_cost_rates(py_costs: &Bound<'_, PyDict>) -> PyResult<CostRates> {
    let defaults = CostRates::default();
    Ok(CostRates {
        recommend_distancing_per_day: extract_with_default(
            py_costs,
            "recommend_distancing_per_day",
            defaults.recommend_distancing_per_day,
        )?,
        isolate_symptomatic_per_day: extract_with_default(
            py_costs,
            "isolate_symptomatic_per_day",
            defaults.isolate_symptomatic_per_day,
        )?,
        isolate_all_per_day: extract_with_default(
            py_costs,
            "isolate_all_per_day",
            defaults.isolate_all_per_day,
        )?,
        cost_per_death: extract_with_default(py_costs, "cost_per_death", defaults.cost_per_death)?,
        overflow_cost_per_case: extract_with_default(
            py_costs,
            "overflow_cost_per_case",
            defaults.overflow_cost_per_case,
        )?,
    })
}

/// Convert a Python dict to a SamplerConfig (missing fields keep defaults).
///
/// Ranges are `(lo, hi)` tuples of days.
pub fn parse_sampler_config(py_config: &Bound<'_, PyDict>) -> PyResult<SamplerConfig> {
    let defaults = SamplerConfig::default();

    let disease = match sub_dict(py_config, "disease")? {
        Some(dict) => parse_disease_params(&dict)?,
        None => defaults.disease.clone(),
    };
    let interventions = match sub_dict(py_config, "interventions")? {
        Some(dict) => parse_intervention_effects(&dict)?,
        None => defaults.interventions.clone(),
    };
    let costs = match sub_dict(py_config, "costs")? {
        Some(dict) => parse_cost_rates(&dict)?,
        None => defaults.costs.clone(),
    };

    Ok(SamplerConfig {
        p_no_outbreak: extract_with_default(py_config, "p_no_outbreak", defaults.p_no_outbreak)?,
        outbreak_day_range: extract_with_default(
            py_config,
            "outbreak_day_range",
            defaults.outbreak_day_range,
        )?,
        vaccine_lag_range: extract_with_default(
            py_config,
            "vaccine_lag_range",
            defaults.vaccine_lag_range,
        )?,
        no_outbreak_max_day: extract_with_default(
            py_config,
            "no_outbreak_max_day",
            defaults.no_outbreak_max_day,
        )?,
        outbreak_max_day: extract_with_default(
            py_config,
            "outbreak_max_day",
            defaults.outbreak_max_day,
        )?,
        index_cases: extract_with_default(py_config, "index_cases", defaults.index_cases)?,
        population: extract_with_default(py_config, "population", defaults.population)?,
        hospital_capacity: extract_with_default(
            py_config,
            "hospital_capacity",
            defaults.hospital_capacity,
        )?,
        daily_vaccinations: extract_with_default(
            py_config,
            "daily_vaccinations",
            defaults.daily_vaccinations,
        )?,
        disease,
        interventions,
        costs,
    })
}

// ========================================================================
// Rust -> Python Converters
// ========================================================================

/// Convert Observables to a Python dict.
pub fn observables_to_py(py: Python<'_>, obs: &Observables) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("day", obs.day)?;
    dict.set_item("population", obs.population)?;
    dict.set_item("susceptible", obs.susceptible)?;
    dict.set_item("exposed", obs.exposed)?;
    dict.set_item("infected", obs.infected)?;
    dict.set_item("critical", obs.critical)?;
    dict.set_item("recovered", obs.recovered)?;
    dict.set_item("dead", obs.dead)?;
    dict.set_item("vaccinated", obs.vaccinated)?;
    dict.set_item("hospital_capacity", obs.hospital_capacity)?;
    dict.set_item("vaccine_available", obs.vaccine_available)?;
    dict.set_item("phase", obs.phase.as_str())?;
    dict.set_item("step_cost", obs.step_cost)?;
    dict.set_item("cumulative_cost", obs.cumulative_cost)?;
    dict.set_item("finished", obs.finished)?;
    Ok(dict.into())
}

/// Convert a Scenario to a Python dict (inverse of `parse_scenario`).
pub fn scenario_to_py(py: Python<'_>, scenario: &Scenario) -> PyResult<Py<PyDict>> {
    let schedule = PyDict::new(py);
    match &scenario.schedule {
        OutbreakSchedule::NoOutbreak { max_day } => {
            schedule.set_item("type", "no_outbreak")?;
            schedule.set_item("max_day", max_day)?;
        }
        OutbreakSchedule::Outbreak {
            outbreak_day,
            vaccine_day,
            max_day,
            index_cases,
        } => {
            schedule.set_item("type", "outbreak")?;
            schedule.set_item("outbreak_day", outbreak_day)?;
            schedule.set_item("vaccine_day", vaccine_day)?;
            schedule.set_item("max_day", max_day)?;
            schedule.set_item("index_cases", index_cases)?;
        }
    }

    let disease = PyDict::new(py);
    disease.set_item("transmission_rate", scenario.disease.transmission_rate)?;
    disease.set_item("incubation_rate", scenario.disease.incubation_rate)?;
    disease.set_item("recovery_rate", scenario.disease.recovery_rate)?;
    disease.set_item("critical_rate", scenario.disease.critical_rate)?;
    disease.set_item("fatality_rate", scenario.disease.fatality_rate)?;
    disease.set_item(
        "overflow_fatality_multiplier",
        scenario.disease.overflow_fatality_multiplier,
    )?;

    let interventions = PyDict::new(py);
    interventions.set_item(
        "recommend_multiplier",
        scenario.interventions.recommend_multiplier,
    )?;
    interventions.set_item(
        "isolate_symptomatic_multiplier",
        scenario.interventions.isolate_symptomatic_multiplier,
    )?;
    interventions.set_item(
        "isolate_all_multiplier",
        scenario.interventions.isolate_all_multiplier,
    )?;

    let costs = PyDict::new(py);
    costs.set_item(
        "recommend_distancing_per_day",
        scenario.costs.recommend_distancing_per_day,
    )?;
    costs.set_item(
        "isolate_symptomatic_per_day",
        scenario.costs.isolate_symptomatic_per_day,
    )?;
    costs.set_item("isolate_all_per_day", scenario.costs.isolate_all_per_day)?;
    costs.set_item("cost_per_death", scenario.costs.cost_per_death)?;
    costs.set_item(
        "overflow_cost_per_case",
        scenario.costs.overflow_cost_per_case,
    )?;

    let dict = PyDict::new(py);
    dict.set_item("population", scenario.population)?;
    dict.set_item("hospital_capacity", scenario.hospital_capacity)?;
    dict.set_item("daily_vaccinations", scenario.daily_vaccinations)?;
    dict.set_item("schedule", schedule)?;
    dict.set_item("disease", disease)?;
    dict.set_item("interventions", interventions)?;
    dict.set_item("costs", costs)?;
    Ok(dict.into())
}

/// Convert one event to a Python dict.
pub fn event_to_py(py: Python<'_>, event: &Event) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("type", event.event_type())?;
    dict.set_item("day", event.day())?;
    match event {
        Event::OutbreakSeeded { index_cases, .. } => {
            dict.set_item("index_cases", index_cases)?;
        }
        Event::HospitalOverflow {
            critical, excess, ..
        } => {
            dict.set_item("critical", critical)?;
            dict.set_item("excess", excess)?;
        }
        Event::VaccineAvailable { .. }
        | Event::OutbreakExtinguished { .. }
        | Event::HorizonReached { .. } => {}
    }
    Ok(dict.into())
}

/// Convert a slice of events to a Python list of dicts.
pub fn events_to_py(py: Python<'_>, events: &[Event]) -> PyResult<Py<PyList>> {
    let list = PyList::empty(py);
    for event in events {
        list.append(event_to_py(py, event)?)?;
    }
    Ok(list.into())
}
