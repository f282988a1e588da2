//! Caller-supplied intervention flags.
//!
//! The engine takes one `InterventionInput` per step; the control loop on
//! the other side of the FFI treats the eight flag combinations as its
//! discrete action space.

use serde::{Deserialize, Serialize};

use crate::models::disease::InterventionEffects;

/// The three intervention toggles supplied with every step.
///
/// Flags compose: any subset may be active simultaneously, and their
/// transmission multipliers multiply together.
///
/// # Example
///
/// ```rust
/// use epidemic_simulator_core_rs::InterventionInput;
///
/// let input = InterventionInput::from_action_index(0b101);
/// assert!(input.recommend_distancing);
/// assert!(!input.isolate_symptomatic);
/// assert!(input.isolate_all);
/// assert_eq!(input.action_index(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterventionInput {
    /// Voluntary distancing recommendation (mildest).
    pub recommend_distancing: bool,

    /// Mandatory isolation of symptomatic cases.
    pub isolate_symptomatic: bool,

    /// Mandatory isolation of the whole population (strictest).
    pub isolate_all: bool,
}

impl InterventionInput {
    /// No interventions active.
    pub fn none() -> Self {
        Self::default()
    }

    /// All three interventions active.
    pub fn all() -> Self {
        Self {
            recommend_distancing: true,
            isolate_symptomatic: true,
            isolate_all: true,
        }
    }

    /// Decode a 3-bit action index: bit 0 = recommend distancing,
    /// bit 1 = isolate symptomatic, bit 2 = isolate all. Higher bits are
    /// ignored.
    pub fn from_action_index(action: u8) -> Self {
        Self {
            recommend_distancing: action & 0b001 != 0,
            isolate_symptomatic: action & 0b010 != 0,
            isolate_all: action & 0b100 != 0,
        }
    }

    /// Encode back into the 3-bit action index.
    pub fn action_index(&self) -> u8 {
        (self.recommend_distancing as u8)
            | ((self.isolate_symptomatic as u8) << 1)
            | ((self.isolate_all as u8) << 2)
    }

    /// Whether any intervention is active.
    pub fn any_active(&self) -> bool {
        self.recommend_distancing || self.isolate_symptomatic || self.isolate_all
    }

    /// Effective transmission multiplier: the product of the multipliers of
    /// the active interventions, 1.0 when none are active.
    pub fn transmission_multiplier(&self, effects: &InterventionEffects) -> f64 {
        let mut multiplier = 1.0;
        if self.recommend_distancing {
            multiplier *= effects.recommend_multiplier;
        }
        if self.isolate_symptomatic {
            multiplier *= effects.isolate_symptomatic_multiplier;
        }
        if self.isolate_all {
            multiplier *= effects.isolate_all_multiplier;
        }
        multiplier
    }
}
