//! Greedy evaluation results

use serde::{Deserialize, Serialize};

use qlearn_core::RewardStats;

/// Per-episode outcome of a greedy evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Total reward of each test episode
    pub rewards: Vec<f64>,
    /// Step count of each test episode
    pub steps: Vec<usize>,
    /// Mean, max and min over `rewards`
    pub stats: RewardStats,
}

impl EvaluationReport {
    /// Build a report from per-episode results, `None` if there were none
    #[must_use]
    pub fn new(rewards: Vec<f64>, steps: Vec<usize>) -> Option<Self> {
        let stats = RewardStats::from_rewards(&rewards)?;
        Some(Self {
            rewards,
            steps,
            stats,
        })
    }

    /// Number of evaluated episodes
    #[must_use]
    pub fn episodes(&self) -> usize {
        self.rewards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_stats() {
        let report = EvaluationReport::new(vec![500.0, 120.0, 260.0], vec![500, 120, 260]).unwrap();
        assert_eq!(report.episodes(), 3);
        assert_eq!(report.stats.max, 500.0);
        assert_eq!(report.stats.min, 120.0);
        assert!((report.stats.mean - 293.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_empty_report_is_none() {
        assert!(EvaluationReport::new(Vec::new(), Vec::new()).is_none());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = EvaluationReport::new(vec![10.0], vec![10]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stats"]["mean"], 10.0);
        assert_eq!(json["steps"][0], 10);
    }
}
