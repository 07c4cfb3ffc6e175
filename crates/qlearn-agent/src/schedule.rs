//! Exploration-rate schedules

use serde::{Deserialize, Serialize};

/// Multiplicative decay with a floor: `v ← max(min_value, v · decay_rate)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDecay {
    /// Current value
    value: f64,
    /// Minimum value
    pub min_value: f64,
    /// Decay rate
    pub decay_rate: f64,
}

impl ExponentialDecay {
    /// Create a new exponential schedule
    #[must_use]
    pub fn new(start: f64, min_value: f64, decay_rate: f64) -> Self {
        Self {
            value: start.max(min_value),
            min_value,
            decay_rate,
        }
    }

    /// Current value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance one step and return the new value
    pub fn step(&mut self) -> f64 {
        self.value = (self.value * self.decay_rate).max(self.min_value);
        self.value
    }
}
