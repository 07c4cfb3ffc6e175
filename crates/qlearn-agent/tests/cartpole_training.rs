use qlearn_agent::{
    load_table_checked, AgentConfig, CheckpointPolicy, Discretizer, DiscretizerConfig, Trainer,
    TrainingConfig,
};
use qlearn_env::{noisy_cartpole, EnvironmentConfig, NoiseConfig};
use tempfile::tempdir;

fn env_config(seed: u64) -> EnvironmentConfig {
    EnvironmentConfig {
        seed: Some(seed),
        ..EnvironmentConfig::default()
    }
}

fn training(episodes: usize) -> TrainingConfig {
    TrainingConfig {
        episodes,
        log_interval: 10,
        ..TrainingConfig::default()
    }
}

#[tokio::test]
async fn trains_on_noisy_cartpole_and_reloads_checkpoint() {
    let dir = tempdir().unwrap();
    let model = dir.path().join("q_learning.bin");
    let env = noisy_cartpole(&env_config(11), &NoiseConfig::default()).unwrap();
    let grid = Discretizer::from_config(&DiscretizerConfig::default()).unwrap();

    let mut trainer = Trainer::new(env, &AgentConfig::default(), grid, training(30))
        .unwrap()
        .with_seed(3)
        .with_checkpoint_path(&model);
    let summary = trainer.train().await.unwrap();

    assert_eq!(summary.episodes, 30);
    assert!(summary.checkpoints_written >= 1);
    assert_eq!(summary.checkpoints_failed, 0);
    assert!(summary.final_epsilon < AgentConfig::default().epsilon);
    assert!(dir.path().join("q_learning_rewards.csv").exists());

    let table = load_table_checked(&model, &[15, 15, 15, 15, 2]).unwrap();
    assert!(table.view_dyn().unwrap().iter().any(|&v| v != 0.0));

    let report = trainer.evaluate(3).await.unwrap();
    assert_eq!(report.episodes(), 3);
    for (&reward, &steps) in report.rewards.iter().zip(&report.steps) {
        assert!((1..=500).contains(&steps));
        assert_eq!(reward, steps as f64);
    }
}

#[tokio::test]
async fn resumes_from_saved_table() {
    let dir = tempdir().unwrap();
    let model = dir.path().join("model.bin");
    let grid = Discretizer::from_config(&DiscretizerConfig::default()).unwrap();

    let env = noisy_cartpole(&env_config(5), &NoiseConfig::default()).unwrap();
    let config = TrainingConfig {
        checkpoint: CheckpointPolicy::Interval { every: 10 },
        ..training(10)
    };
    let mut first = Trainer::new(env, &AgentConfig::default(), grid.clone(), config)
        .unwrap()
        .with_checkpoint_path(&model);
    first.train().await.unwrap();
    let learned = first.into_table();

    let loaded = load_table_checked(&model, &[15, 15, 15, 15, 2]).unwrap();
    assert_eq!(loaded, learned);

    let env = noisy_cartpole(&env_config(6), &NoiseConfig::default()).unwrap();
    let resumed = Trainer::new(env, &AgentConfig::default(), grid, training(1))
        .unwrap()
        .with_table(loaded)
        .unwrap();
    assert_eq!(*resumed.table(), learned);
}
