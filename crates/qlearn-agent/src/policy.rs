//! Epsilon-greedy action selection over a Q-table

use rand::Rng;

use qlearn_core::{DiscreteAction, DiscreteSpace, Result};

use crate::config::AgentConfig;
use crate::discretizer::DiscreteState;
use crate::q_table::QTable;
use crate::schedule::ExponentialDecay;

/// Pick an action for `state`.
///
/// With probability `epsilon` the action is uniform over the table's actions,
/// otherwise it is the greedy action (lowest index on ties). `epsilon <= 0`
/// never touches `rng`.
pub fn choose_action<R: Rng + ?Sized>(
    state: &DiscreteState,
    table: &QTable,
    epsilon: f64,
    rng: &mut R,
) -> DiscreteAction {
    if epsilon > 0.0 && rng.gen::<f64>() < epsilon {
        DiscreteSpace::new(table.num_actions()).sample(rng)
    } else {
        table.greedy_action(state)
    }
}

/// Epsilon-greedy behaviour policy with per-episode decay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    schedule: ExponentialDecay,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy policy
    #[must_use]
    pub fn new(epsilon: f64, epsilon_min: f64, epsilon_decay: f64) -> Self {
        Self {
            schedule: ExponentialDecay::new(epsilon, epsilon_min, epsilon_decay),
        }
    }

    /// Create a policy from validated hyperparameters
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.epsilon,
            config.epsilon_min,
            config.epsilon_decay,
        ))
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.schedule.value()
    }

    /// Select an action with the current exploration rate
    pub fn choose<R: Rng + ?Sized>(
        &self,
        state: &DiscreteState,
        table: &QTable,
        rng: &mut R,
    ) -> DiscreteAction {
        choose_action(state, table, self.epsilon(), rng)
    }

    /// Apply one episode's worth of decay
    pub fn decay(&mut self) -> f64 {
        self.schedule.step()
    }
}
