//! Reinforcement learning environments for tabular control
//!
//! This crate provides:
//! - the classic cart-pole simulation
//! - a generic observation wrapper
//! - additive Gaussian sensor noise for that wrapper

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classic;
pub mod noise;
pub mod wrappers;

// Re-export environments
pub use classic::{CartPoleConfig, CartPoleEnv, CartPoleState};
pub use noise::{NoiseConfig, NoisyObservation, CARTPOLE_NOISE_SCALES};
pub use wrappers::{ObservationTransform, ObservationWrapper};

// Re-export core types
pub use qlearn_core::{
    BoxObservationSpace, DiscreteAction, DiscreteSpace, Environment, EnvironmentConfig,
    Observation, Reward, Step, VectorObservation,
};

/// Cart-pole whose observations carry sensor noise
pub type NoisyCartPole = ObservationWrapper<CartPoleEnv, NoisyObservation>;

/// Build a cart-pole environment behind a noise wrapper.
///
/// The simulation and the noise each derive their generator from `config.seed`
/// so a seeded run is reproducible end to end.
pub fn noisy_cartpole(
    config: &EnvironmentConfig,
    noise: &NoiseConfig,
) -> qlearn_core::Result<NoisyCartPole> {
    let env = CartPoleEnv::new(config);
    let noise_seed = config.seed.map(|s| s.wrapping_add(1));
    let transform = NoisyObservation::from_config(noise, noise_seed)?;
    tracing::debug!(noise_std = noise.noise_std, "wrapping cart-pole with sensor noise");
    Ok(ObservationWrapper::new(env, transform))
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{noisy_cartpole, CartPoleEnv, NoiseConfig, NoisyObservation, ObservationWrapper};
    pub use qlearn_core::prelude::*;
}
