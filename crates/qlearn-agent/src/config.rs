//! Agent, discretizer and training configuration

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use qlearn_core::{RLError, Result};

/// Learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Learning rate (α)
    pub learning_rate: f64,
    /// Discount factor (γ)
    pub gamma: f64,
    /// Initial exploration rate (ε)
    pub epsilon: f64,
    /// Multiplicative ε decay applied after every episode
    pub epsilon_decay: f64,
    /// Floor for ε
    pub epsilon_min: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            gamma: 0.7,
            epsilon: 0.99,
            epsilon_decay: 0.9999,
            epsilon_min: 0.01,
        }
    }
}

impl AgentConfig {
    /// Reject hyperparameters outside their meaningful ranges
    pub fn validate(&self) -> Result<()> {
        fn in_range(name: &str, value: f64, low_open: bool, low: f64, high: f64) -> Result<()> {
            let above = if low_open { value > low } else { value >= low };
            if above && value <= high {
                Ok(())
            } else {
                let open = if low_open { "(" } else { "[" };
                Err(RLError::InvalidConfig(format!(
                    "{name} must be in {open}{low}, {high}], got {value}"
                )))
            }
        }

        in_range("learning_rate", self.learning_rate, true, 0.0, 1.0)?;
        in_range("gamma", self.gamma, false, 0.0, 1.0)?;
        in_range("epsilon", self.epsilon, false, 0.0, 1.0)?;
        in_range("epsilon_decay", self.epsilon_decay, true, 0.0, 1.0)?;
        in_range("epsilon_min", self.epsilon_min, false, 0.0, 1.0)?;
        if self.epsilon_min > self.epsilon {
            return Err(RLError::InvalidConfig(format!(
                "epsilon_min ({}) exceeds epsilon ({})",
                self.epsilon_min, self.epsilon
            )));
        }
        Ok(())
    }
}

/// Bin count and nominal range of one observation dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Number of bins
    pub bins: usize,
    /// Value mapped to the first bin
    pub low: f64,
    /// Value mapped to the last bin
    pub high: f64,
}

impl BinSpec {
    /// Create a new bin spec
    #[must_use]
    pub fn new(bins: usize, low: f64, high: f64) -> Self {
        Self { bins, low, high }
    }
}

/// Per-dimension discretization grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizerConfig {
    /// One entry per observation dimension
    pub dims: Vec<BinSpec>,
}

impl Default for DiscretizerConfig {
    /// 15 bins per cart-pole dimension; angular bounds in radians.
    ///
    /// The cart position spans the symmetric terminal range ±2.4. Older
    /// configurations used `(-2.4, 24.0)`, which leaves most position bins
    /// unreachable; set `dims` from TOML to reproduce that grid.
    fn default() -> Self {
        let deg = PI / 180.0;
        Self {
            dims: vec![
                BinSpec::new(15, -2.4, 2.4),
                BinSpec::new(15, -10.0, 10.0),
                BinSpec::new(15, -12.0 * deg, 12.0 * deg),
                BinSpec::new(15, -10.0 * deg, 10.0 * deg),
            ],
        }
    }
}

/// When the trainer writes the Q-table to disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CheckpointPolicy {
    /// Save when an episode beats the last saved reward by more than `min_delta`
    OnImprovement {
        /// Required margin over the last checkpointed reward
        #[serde(default)]
        min_delta: f64,
    },
    /// Save after every `every` episodes
    Interval {
        /// Episodes between saves
        every: usize,
    },
    /// Never save during training
    Never,
}

impl Default for CheckpointPolicy {
    fn default() -> Self {
        Self::OnImprovement { min_delta: 0.0 }
    }
}

/// Episode budget and bookkeeping for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,
    /// Step cap per episode; reaching it counts as success
    pub max_episode_steps: usize,
    /// Emit a progress line every this many episodes (0 disables)
    pub log_interval: usize,
    /// Number of greedy evaluation episodes
    pub eval_episodes: usize,
    /// Checkpoint trigger
    pub checkpoint: CheckpointPolicy,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 100_000,
            max_episode_steps: 500,
            log_interval: 100,
            eval_episodes: 20,
            checkpoint: CheckpointPolicy::default(),
        }
    }
}

impl TrainingConfig {
    /// Reject empty budgets and degenerate checkpoint settings
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(RLError::InvalidConfig("episodes must be positive".to_string()));
        }
        if self.max_episode_steps == 0 {
            return Err(RLError::InvalidConfig(
                "max_episode_steps must be positive".to_string(),
            ));
        }
        match self.checkpoint {
            CheckpointPolicy::OnImprovement { min_delta } if !(min_delta >= 0.0) => {
                Err(RLError::InvalidConfig(format!(
                    "checkpoint min_delta must be non-negative, got {min_delta}"
                )))
            }
            CheckpointPolicy::Interval { every: 0 } => Err(RLError::InvalidConfig(
                "checkpoint interval must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
