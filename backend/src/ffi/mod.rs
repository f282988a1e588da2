//! Python FFI layer
//!
//! Thin wrappers exposing the engine and environment to Python. Kept
//! behind the `pyo3` feature so the pure-Rust crate builds without a
//! Python toolchain.

pub mod engine;
pub mod env;
pub mod types;

pub use engine::PyEpiModel;
pub use env::PyEpiEnv;
