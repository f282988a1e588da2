//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation,
//! plus the distribution samplers the compartment flows draw from.
//! CRITICAL: All randomness in the simulator MUST go through this module.

mod sampling;
mod xorshift;

pub use xorshift::RngManager;
