//! Environment traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{BoxObservationSpace, DiscreteAction, DiscreteSpace, Observation, Reward};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode reached a terminal state
    pub terminated: bool,
    /// Whether the episode was truncated (e.g., time limit)
    pub truncated: bool,
    /// Additional info from the environment
    pub info: StepInfo,
}

impl<O> Step<O> {
    /// Whether the episode is over for either reason
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }

    /// Replace the observation, keeping everything else
    pub fn map_observation<P>(self, f: impl FnOnce(O) -> P) -> Step<P> {
        Step {
            observation: f(self.observation),
            reward: self.reward,
            terminated: self.terminated,
            truncated: self.truncated,
            info: self.info,
        }
    }
}

/// Additional information from a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Custom fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Configuration for environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Maximum episode steps before truncation
    pub max_steps: Option<usize>,
}

/// Core environment trait
///
/// `reset` and `step` are the only points where a training run suspends.
#[async_trait]
pub trait Environment: Send + Sync {
    /// Observation type
    type Observation: Observation;

    /// Nominal bounds of the observation vector
    fn observation_space(&self) -> BoxObservationSpace;

    /// Get the action space
    fn action_space(&self) -> DiscreteSpace;

    /// Reset the environment
    async fn reset(&mut self) -> crate::Result<(Self::Observation, StepInfo)>;

    /// Take a step in the environment
    async fn step(&mut self, action: DiscreteAction) -> crate::Result<Step<Self::Observation>>;

    /// Close the environment
    async fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VectorObservation;

    fn step(terminated: bool, truncated: bool) -> Step<VectorObservation> {
        Step {
            observation: VectorObservation::new(vec![0.0; 4]),
            reward: Reward(1.0),
            terminated,
            truncated,
            info: StepInfo::default(),
        }
    }

    #[test]
    fn test_done_covers_termination_and_truncation() {
        assert!(!step(false, false).is_done());
        assert!(step(true, false).is_done());
        assert!(step(false, true).is_done());
    }

    #[test]
    fn test_map_observation_keeps_flags() {
        let mapped = step(true, false).map_observation(|o| o.data.len());
        assert_eq!(mapped.observation, 4);
        assert!(mapped.terminated);
        assert_eq!(mapped.reward, Reward(1.0));
    }
}
