//! Episode records and the training history log

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of one completed episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Zero-based episode index
    pub episode: usize,
    /// Sum of rewards collected in the episode
    pub total_reward: f64,
    /// Number of environment steps taken
    pub steps: usize,
}

/// Append-only log of completed episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    records: Vec<EpisodeRecord>,
}

impl TrainingHistory {
    /// Create an empty history with room for `episodes` records
    #[must_use]
    pub fn with_capacity(episodes: usize) -> Self {
        Self {
            records: Vec::with_capacity(episodes),
        }
    }

    /// Append a completed episode
    pub fn push(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    /// Number of recorded episodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no episode has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Summary statistics over the recorded totals
    #[must_use]
    pub fn reward_stats(&self) -> Option<RewardStats> {
        let rewards: Vec<f64> = self.records.iter().map(|r| r.total_reward).collect();
        RewardStats::from_rewards(&rewards)
    }

    /// Write the history as `Episode,Total Reward` CSV rows
    pub fn write_csv(&self, path: &Path) -> crate::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "Episode,Total Reward")?;
        for record in &self.records {
            writeln!(writer, "{},{}", record.episode, record.total_reward)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Mean, maximum and minimum of a set of episode rewards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Highest reward
    pub max: f64,
    /// Lowest reward
    pub min: f64,
}

impl RewardStats {
    /// Compute statistics, or `None` for an empty slice
    #[must_use]
    pub fn from_rewards(rewards: &[f64]) -> Option<Self> {
        if rewards.is_empty() {
            return None;
        }
        let total: f64 = rewards.iter().sum();
        let max = rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = rewards.iter().copied().fold(f64::INFINITY, f64::min);
        #[allow(clippy::cast_precision_loss)]
        let mean = total / rewards.len() as f64;
        Some(Self { mean, max, min })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(episode: usize, total_reward: f64) -> EpisodeRecord {
        EpisodeRecord {
            episode,
            total_reward,
            steps: total_reward as usize,
        }
    }

    #[test]
    fn test_reward_stats() {
        let stats = RewardStats::from_rewards(&[10.0, 30.0, 20.0]).unwrap();
        assert_eq!(stats.mean, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.min, 10.0);

        assert!(RewardStats::from_rewards(&[]).is_none());
    }

    #[test]
    fn test_history_is_append_only_in_order() {
        let mut history = TrainingHistory::with_capacity(2);
        assert!(history.is_empty());
        history.push(record(0, 12.0));
        history.push(record(1, 40.0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.reward_stats().unwrap().max, 40.0);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_rewards.csv");

        let mut history = TrainingHistory::default();
        history.push(record(0, 9.0));
        history.push(record(1, 21.5));
        history.write_csv(&path).unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv, "Episode,Total Reward\n0,9\n1,21.5\n");
    }
}
