//! xorshift64* random number generator
//!
//! Small, fast, and good enough statistically (passes BigCrush) for
//! drawing daily compartment flows. What actually matters here is the
//! determinism contract: one u64 of state, advanced by a fixed recurrence,
//! so a seed pins an entire episode and a checkpointed state word resumes
//! the stream mid-sequence without replaying anything.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// Every random draw an engine makes flows through one of these, so a
/// `(seed, input sequence)` pair fully determines an episode.
///
/// # Example
/// ```
/// use epidemic_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let uniform = rng.next_f64(); // [0.0, 1.0)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a generator from a seed.
    ///
    /// Seed 0 is mapped to 1: an all-zero state is the one fixed point of
    /// the xorshift recurrence and would freeze the stream.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Recreate an RNG from a previously captured state word.
    ///
    /// Used when resuming an engine from a checkpoint: the restored
    /// generator continues the exact sequence the snapshotted one would
    /// have produced.
    ///
    /// # Example
    /// ```
    /// use epidemic_simulator_core_rs::RngManager;
    ///
    /// let mut original = RngManager::new(42);
    /// original.next();
    ///
    /// let mut resumed = RngManager::from_state(original.get_state());
    /// assert_eq!(original.next(), resumed.next());
    /// ```
    pub fn from_state(state: u64) -> Self {
        // A live generator can never hold state 0; tolerate it anyway.
        let state = if state == 0 { 1 } else { state };
        Self { state }
    }

    /// Advance the state and return the next 64-bit value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Current state word. Pair with [`RngManager::from_state`] to resume
    /// the stream from a checkpoint.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Next uniform f64 in [0.0, 1.0).
    ///
    /// # Example
    /// ```
    /// use epidemic_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) with 53-bit resolution
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }
}
