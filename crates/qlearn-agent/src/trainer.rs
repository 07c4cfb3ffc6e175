//! Episode loop: training with checkpoints, and greedy evaluation

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use qlearn_core::{
    Environment, EpisodeRecord, Observation, RLError, Result, Reward, RewardStats,
    TrainingHistory,
};

use crate::config::{AgentConfig, CheckpointPolicy, TrainingConfig};
use crate::discretizer::{DiscreteState, Discretizer};
use crate::evaluation::EvaluationReport;
use crate::learner::QLearner;
use crate::persistence::save_table;
use crate::policy::EpsilonGreedy;
use crate::q_table::QTable;

/// Outcome of a full training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Episodes completed
    pub episodes: usize,
    /// Highest episode reward seen
    pub best_reward: Option<f64>,
    /// Episode in which `best_reward` was first reached
    pub best_episode: Option<usize>,
    /// Mean, max and min over every training episode
    pub reward_stats: Option<RewardStats>,
    /// Exploration rate after the last decay
    pub final_epsilon: f64,
    /// Checkpoints written successfully
    pub checkpoints_written: usize,
    /// Checkpoint attempts that failed
    pub checkpoints_failed: usize,
    /// Where the reward history was written, if it was
    pub history_csv: Option<PathBuf>,
}

/// Upper bound on the history allocation made up front
const HISTORY_PREALLOC: usize = 1 << 20;

/// Path of the reward history written next to `model`: `<stem>_rewards.csv`
#[must_use]
pub fn history_path_for(model: &Path) -> PathBuf {
    let stem = model
        .file_stem()
        .map_or_else(|| "model".to_string(), |s| s.to_string_lossy().into_owned());
    model.with_file_name(format!("{stem}_rewards.csv"))
}

/// Drives one environment with a tabular Q-learning agent
pub struct Trainer<E: Environment> {
    env: E,
    discretizer: Discretizer,
    learner: QLearner,
    policy: EpsilonGreedy,
    config: TrainingConfig,
    rng: StdRng,
    history: TrainingHistory,
    best: Option<(f64, usize)>,
    checkpoint_path: Option<PathBuf>,
    checkpoint_reference: Option<f64>,
    checkpoints_written: usize,
    checkpoints_failed: usize,
}

impl<E: Environment> Trainer<E> {
    /// Create a trainer with a zeroed Q-table sized for `env` and `discretizer`
    pub fn new(
        env: E,
        agent: &AgentConfig,
        discretizer: Discretizer,
        config: TrainingConfig,
    ) -> Result<Self> {
        config.validate()?;
        let observed = env.observation_space().dim();
        if observed != discretizer.dim() {
            return Err(RLError::DimensionMismatch {
                expected: discretizer.dim(),
                actual: observed,
            });
        }
        let actions = env.action_space().n;
        if actions == 0 {
            return Err(RLError::InvalidConfig(
                "environment has an empty action space".to_string(),
            ));
        }
        let table = QTable::zeros(&discretizer.shape(), actions)?;
        let learner = QLearner::from_config(table, agent)?;
        let policy = EpsilonGreedy::from_config(agent)?;

        Ok(Self {
            env,
            discretizer,
            learner,
            policy,
            history: TrainingHistory::with_capacity(config.episodes.min(HISTORY_PREALLOC)),
            config,
            rng: StdRng::from_entropy(),
            best: None,
            checkpoint_path: None,
            checkpoint_reference: None,
            checkpoints_written: 0,
            checkpoints_failed: 0,
        })
    }

    /// Start from a previously trained table
    pub fn with_table(mut self, table: QTable) -> Result<Self> {
        let mut expected = self.discretizer.shape();
        expected.push(self.env.action_space().n);
        if table.shape() != expected {
            return Err(RLError::ShapeMismatch {
                expected,
                actual: table.shape(),
            });
        }
        self.learner = QLearner::new(table, self.learner.alpha(), self.learner.gamma());
        Ok(self)
    }

    /// Seed the exploration generator
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Write checkpoints (and the reward history) next to `path`
    #[must_use]
    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        self
    }

    /// Current Q-table
    #[must_use]
    pub fn table(&self) -> &QTable {
        self.learner.table()
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    /// The wrapped environment
    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Give up the learned table
    #[must_use]
    pub fn into_table(self) -> QTable {
        self.learner.into_table()
    }

    /// Play one episode and return its total reward and step count.
    ///
    /// With `learn` unset the policy is greedy and the table is left untouched.
    pub async fn run_episode(&mut self, learn: bool) -> Result<(f64, usize)> {
        let (observation, _) = self.env.reset().await?;
        let mut state = self.observe(&observation)?;
        let mut total = Reward::default();
        let mut steps = 0;

        loop {
            let table = self.learner.table();
            let action = if learn {
                self.policy.choose(&state, table, &mut self.rng)
            } else {
                table.greedy_action(&state)
            };
            let step = self.env.step(action).await?;
            let next_state = self.observe(&step.observation)?;
            total += step.reward;
            steps += 1;

            if learn {
                self.learner
                    .update(&state, action, step.reward.value(), &next_state, step.terminated);
            }
            state = next_state;

            if step.is_done() {
                break;
            }
            if steps >= self.config.max_episode_steps {
                debug!(steps, "step cap reached, episode counts as balanced");
                break;
            }
        }

        Ok((total.value(), steps))
    }

    /// Run the configured number of training episodes
    pub async fn train(&mut self) -> Result<TrainingSummary> {
        let episodes = self.config.episodes;
        info!(
            episodes,
            epsilon = self.policy.epsilon(),
            states = self.learner.table().num_states(),
            "Starting Q-learning training"
        );

        for episode in 0..episodes {
            let (total_reward, steps) = self.run_episode(true).await?;
            let epsilon = self.policy.decay();
            self.history.push(EpisodeRecord {
                episode,
                total_reward,
                steps,
            });

            if self.best.map_or(true, |(best, _)| total_reward > best) {
                self.best = Some((total_reward, episode));
                debug!(episode, total_reward, "New best reward");
            }
            if self.should_checkpoint(episode, total_reward) {
                self.checkpoint(episode, total_reward);
            }

            let log_interval = self.config.log_interval;
            if log_interval > 0 && (episode + 1) % log_interval == 0 {
                info!(episode, total_reward, epsilon, steps, "Training progress");
            }
        }

        let history_csv = self.write_history();
        let summary = TrainingSummary {
            episodes: self.history.len(),
            best_reward: self.best.map(|(reward, _)| reward),
            best_episode: self.best.map(|(_, episode)| episode),
            reward_stats: self.history.reward_stats(),
            final_epsilon: self.policy.epsilon(),
            checkpoints_written: self.checkpoints_written,
            checkpoints_failed: self.checkpoints_failed,
            history_csv,
        };
        info!(
            episodes = summary.episodes,
            best_reward = ?summary.best_reward,
            checkpoints = summary.checkpoints_written,
            "Training session completed"
        );
        Ok(summary)
    }

    /// Play `episodes` greedy episodes without learning
    pub async fn evaluate(&mut self, episodes: usize) -> Result<EvaluationReport> {
        if episodes == 0 {
            return Err(RLError::InvalidConfig(
                "evaluation needs at least one episode".to_string(),
            ));
        }

        let mut rewards = Vec::with_capacity(episodes);
        let mut steps = Vec::with_capacity(episodes);
        for episode in 0..episodes {
            let (total_reward, episode_steps) = self.run_episode(false).await?;
            info!(episode, total_reward, steps = episode_steps, "Test episode");
            rewards.push(total_reward);
            steps.push(episode_steps);
        }

        let report = EvaluationReport::new(rewards, steps).ok_or_else(|| {
            RLError::InvalidConfig("evaluation produced no episodes".to_string())
        })?;
        info!(
            mean = report.stats.mean,
            max = report.stats.max,
            min = report.stats.min,
            "Evaluation finished"
        );
        Ok(report)
    }

    fn observe(&self, observation: &E::Observation) -> Result<DiscreteState> {
        if observation.dim() != self.discretizer.dim() {
            return Err(RLError::DimensionMismatch {
                expected: self.discretizer.dim(),
                actual: observation.dim(),
            });
        }
        Ok(self.discretizer.discretize(observation.values()))
    }

    fn should_checkpoint(&self, episode: usize, total_reward: f64) -> bool {
        if self.checkpoint_path.is_none() {
            return false;
        }
        match self.config.checkpoint {
            CheckpointPolicy::OnImprovement { min_delta } => self
                .checkpoint_reference
                .map_or(true, |reference| total_reward > reference + min_delta),
            CheckpointPolicy::Interval { every } => (episode + 1) % every == 0,
            CheckpointPolicy::Never => false,
        }
    }

    /// Save the table; a failure is logged and counted, never propagated
    fn checkpoint(&mut self, episode: usize, total_reward: f64) {
        let Some(path) = self.checkpoint_path.as_deref() else {
            return;
        };
        self.checkpoint_reference = Some(total_reward);

        match save_table(self.learner.table(), path) {
            Ok(()) => {
                self.checkpoints_written += 1;
                info!(episode, total_reward, path = %path.display(), "Saved checkpoint");
            }
            Err(e) => {
                self.checkpoints_failed += 1;
                error!(
                    episode,
                    path = %path.display(),
                    error = %e,
                    "Failed to save checkpoint, training continues"
                );
            }
        }
    }

    fn write_history(&self) -> Option<PathBuf> {
        let model = self.checkpoint_path.as_deref()?;
        let path = history_path_for(model);
        match self.history.write_csv(&path) {
            Ok(()) => {
                info!(path = %path.display(), episodes = self.history.len(), "Wrote reward history");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write reward history");
                None
            }
        }
    }
}
