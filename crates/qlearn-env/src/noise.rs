//! Additive Gaussian sensor noise

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use qlearn_core::{Observation, RLError, Result};

use crate::wrappers::ObservationTransform;

/// Per-dimension noise scale for cart-pole: position, velocity, angle, angular velocity.
pub const CARTPOLE_NOISE_SCALES: [f64; 4] = [2.0, 0.5, 2.0 * PI / 180.0, 0.5 * PI / 180.0];

/// Sensor noise settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Standard deviation of the unit Gaussian before scaling
    pub noise_std: f64,
    /// Multiplier applied to the sample of each dimension
    pub scales: Vec<f64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            noise_std: 0.1,
            scales: CARTPOLE_NOISE_SCALES.to_vec(),
        }
    }
}

impl NoiseConfig {
    /// Check that the noise level is usable
    pub fn validate(&self) -> Result<()> {
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(RLError::InvalidConfig(format!(
                "noise_std must be finite and non-negative, got {}",
                self.noise_std
            )));
        }
        if self.scales.iter().any(|s| !s.is_finite()) {
            return Err(RLError::InvalidConfig(
                "noise scales must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Adds `N(0, noise_std) * scale_i` to dimension `i` of every observation.
///
/// Dimensions without a configured scale pass through unchanged.
#[derive(Debug, Clone)]
pub struct NoisyObservation<R = StdRng> {
    normal: Normal<f64>,
    scales: Vec<f64>,
    rng: R,
}

impl NoisyObservation<StdRng> {
    /// Build the transform from config, seeding its generator when a seed is given
    pub fn from_config(config: &NoiseConfig, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }
}

impl<R: Rng> NoisyObservation<R> {
    /// Build the transform with an explicit random source
    pub fn new(config: &NoiseConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let normal = Normal::new(0.0, config.noise_std)
            .map_err(|e| RLError::InvalidConfig(format!("noise distribution: {e}")))?;
        Ok(Self {
            normal,
            scales: config.scales.clone(),
            rng,
        })
    }

    /// Return a noisy copy of `observation`
    pub fn apply<O: Observation>(&mut self, mut observation: O) -> O {
        for (value, scale) in observation.values_mut().iter_mut().zip(&self.scales) {
            *value += self.normal.sample(&mut self.rng) * scale;
        }
        observation
    }
}

impl<O, R> ObservationTransform<O> for NoisyObservation<R>
where
    O: Observation,
    R: Rng + Send + Sync,
{
    fn transform(&mut self, observation: O) -> O {
        self.apply(observation)
    }
}
