//! One-step Q-learning (TD(0) with a max-Q bootstrap)

use qlearn_core::{DiscreteAction, Result};

use crate::config::AgentConfig;
use crate::discretizer::DiscreteState;
use crate::q_table::QTable;

/// Owns the Q-table and applies the temporal-difference update to it
#[derive(Debug, Clone, PartialEq)]
pub struct QLearner {
    table: QTable,
    alpha: f64,
    gamma: f64,
}

impl QLearner {
    /// Create a learner around an existing table
    #[must_use]
    pub fn new(table: QTable, alpha: f64, gamma: f64) -> Self {
        Self {
            table,
            alpha,
            gamma,
        }
    }

    /// Create a learner from validated hyperparameters
    pub fn from_config(table: QTable, config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(table, config.learning_rate, config.gamma))
    }

    /// Learning rate (α)
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Discount factor (γ)
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Read access to the table
    #[must_use]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Give up the table
    #[must_use]
    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Move `Q[state][action]` towards `reward + γ · max Q[next_state]`.
    ///
    /// A terminal transition never bootstraps from `next_state`. Returns the TD
    /// error measured before the update.
    pub fn update(
        &mut self,
        state: &DiscreteState,
        action: DiscreteAction,
        reward: f64,
        next_state: &DiscreteState,
        terminal: bool,
    ) -> f64 {
        let target = if terminal {
            reward
        } else {
            reward + self.gamma * self.table.max_value(next_state)
        };
        let q = self.table.get_mut(state, action);
        let delta = target - *q;
        *q += self.alpha * delta;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cell(indices: &[usize]) -> DiscreteState {
        DiscreteState(indices.to_vec())
    }

    #[test]
    fn test_single_terminal_update_from_zero() {
        let mut learner = QLearner::new(QTable::zeros(&[2, 2, 2, 2], 2).unwrap(), 0.1, 0.7);
        let s = cell(&[0, 0, 0, 0]);

        learner.update(&s, DiscreteAction(0), 1.0, &s, true);

        assert_relative_eq!(learner.table().get(&s, DiscreteAction(0)), 0.1);
        assert_eq!(learner.table().get(&s, DiscreteAction(1)), 0.0);
    }

    #[test]
    fn test_terminal_update_ignores_next_state() {
        let s = cell(&[0]);
        let next = cell(&[1]);
        let mut table = QTable::zeros(&[2], 2).unwrap();
        *table.get_mut(&s, DiscreteAction(1)) = 0.5;
        *table.get_mut(&next, DiscreteAction(0)) = 100.0;
        let mut learner = QLearner::new(table, 0.2, 0.9);

        let delta = learner.update(&s, DiscreteAction(1), 2.0, &next, true);

        assert_relative_eq!(delta, 1.5);
        assert_relative_eq!(learner.table().get(&s, DiscreteAction(1)), 0.5 + 0.2 * 1.5);
    }

    #[test]
    fn test_bootstraps_from_best_next_action() {
        let s = cell(&[0]);
        let next = cell(&[1]);
        let mut table = QTable::zeros(&[2], 2).unwrap();
        *table.get_mut(&next, DiscreteAction(0)) = 1.0;
        *table.get_mut(&next, DiscreteAction(1)) = 3.0;
        let mut learner = QLearner::new(table, 0.5, 0.5);

        let delta = learner.update(&s, DiscreteAction(0), 1.0, &next, false);

        // target = 1 + 0.5 * 3
        assert_relative_eq!(delta, 2.5);
        assert_relative_eq!(learner.table().get(&s, DiscreteAction(0)), 1.25);
    }

    #[test]
    fn test_fixed_point_is_a_no_op() {
        let s = cell(&[0]);
        let next = cell(&[1]);
        let mut table = QTable::zeros(&[2], 2).unwrap();
        *table.get_mut(&next, DiscreteAction(0)) = 2.0;
        *table.get_mut(&next, DiscreteAction(1)) = 4.0;
        *table.get_mut(&s, DiscreteAction(1)) = 3.0;
        let mut learner = QLearner::new(table.clone(), 0.1, 0.5);

        let delta = learner.update(&s, DiscreteAction(1), 1.0, &next, false);

        assert_eq!(delta, 0.0);
        assert_eq!(learner.table(), &table);
    }

    #[test]
    fn test_from_config_validates() {
        let config = AgentConfig {
            gamma: -0.1,
            ..AgentConfig::default()
        };
        assert!(QLearner::from_config(QTable::zeros(&[1], 2).unwrap(), &config).is_err());
    }
}
