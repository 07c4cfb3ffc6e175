//! Core reinforcement learning traits and types for tabular control
//!
//! This crate provides the environment contract the learning core is written
//! against, plus the small value types shared by every other crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod environment;
pub mod error;
pub mod history;
pub mod observation;
pub mod reward;

// Re-export core traits and types
pub use action::{DiscreteAction, DiscreteSpace};
pub use environment::{Environment, EnvironmentConfig, Step, StepInfo};
pub use error::{RLError, Result};
pub use history::{EpisodeRecord, RewardStats, TrainingHistory};
pub use observation::{BoxObservationSpace, Observation, VectorObservation};
pub use reward::Reward;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DiscreteAction, DiscreteSpace, Environment, Observation, Result, Reward, Step,
        VectorObservation,
    };
}
