//! Tabular Q-learning agent
//!
//! This crate provides:
//! - a grid discretizer for continuous observations
//! - a dense Q-table with row-major state indexing
//! - epsilon-greedy action selection with exponential decay
//! - the one-step Q-learning update
//! - a trainer that checkpoints the table and evaluates it greedily

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discretizer;
pub mod evaluation;
pub mod learner;
pub mod persistence;
pub mod policy;
pub mod q_table;
pub mod schedule;
pub mod trainer;

// Re-export configuration
pub use config::{AgentConfig, BinSpec, CheckpointPolicy, DiscretizerConfig, TrainingConfig};

// Re-export agent components
pub use discretizer::{DiscreteState, Discretizer};
pub use evaluation::EvaluationReport;
pub use learner::QLearner;
pub use persistence::{load_table, load_table_checked, save_table};
pub use policy::{choose_action, EpsilonGreedy};
pub use q_table::QTable;
pub use schedule::ExponentialDecay;
pub use trainer::{history_path_for, Trainer, TrainingSummary};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AgentConfig, Discretizer, DiscretizerConfig, EvaluationReport, QTable, Trainer,
        TrainingConfig, TrainingSummary,
    };
    pub use qlearn_core::prelude::*;
}
