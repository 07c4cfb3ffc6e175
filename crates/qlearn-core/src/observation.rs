//! Observation representations and observation spaces

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for continuous observations from an environment
pub trait Observation: Clone + Debug + Send + Sync {
    /// Feature values, one per observation dimension
    fn values(&self) -> &[f64];

    /// Mutable access to the feature values
    fn values_mut(&mut self) -> &mut [f64];

    /// Number of observation dimensions
    fn dim(&self) -> usize {
        self.values().len()
    }
}

/// Vector observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObservation {
    /// The observation data
    pub data: Vec<f64>,
}

impl VectorObservation {
    /// Create a new vector observation
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }
}

impl Observation for VectorObservation {
    fn values(&self) -> &[f64] {
        &self.data
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

/// Box observation space with per-dimension bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxObservationSpace {
    /// Lower bounds
    pub low: Vec<f64>,
    /// Upper bounds
    pub high: Vec<f64>,
}

impl BoxObservationSpace {
    /// Number of dimensions
    #[must_use]
    pub fn dim(&self) -> usize {
        self.low.len()
    }

}
