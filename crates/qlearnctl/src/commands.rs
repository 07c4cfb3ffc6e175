// Subcommand implementations for qlearnctl

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use qlearn_agent::{load_table_checked, Discretizer, EvaluationReport, QTable, Trainer};
use qlearn_core::{Environment, EnvironmentConfig, Observation};
use qlearn_env::{noisy_cartpole, CartPoleEnv, NoisyCartPole, NoisyObservation};

use crate::config::QLearningConfig;
use crate::{EvaluateArgs, NoiseArgs, TrainArgs};

/// `q_learning_<YYYYmmdd_HHMMSS>.bin` in the working directory
fn default_model_path() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("q_learning_%Y%m%d_%H%M%S.bin")
            .to_string(),
    )
}

fn env_config(config: &QLearningConfig, seed: Option<u64>) -> EnvironmentConfig {
    EnvironmentConfig {
        seed,
        max_steps: Some(config.training.max_episode_steps),
        ..EnvironmentConfig::default()
    }
}

fn build_trainer(config: &QLearningConfig, seed: Option<u64>) -> Result<Trainer<NoisyCartPole>> {
    let env = noisy_cartpole(&env_config(config, seed), &config.noise)
        .context("Failed to create noisy cart-pole environment")?;
    let grid = Discretizer::from_config(&config.discretizer)?;
    let trainer = Trainer::new(env, &config.agent, grid, config.training.clone())?;
    Ok(match seed {
        Some(seed) => trainer.with_seed(seed),
        None => trainer,
    })
}

fn load_model(config: &QLearningConfig, path: &Path, num_actions: usize) -> Result<QTable> {
    let grid = Discretizer::from_config(&config.discretizer)?;
    let mut shape = grid.shape();
    shape.push(num_actions);
    load_table_checked(path, &shape)
        .with_context(|| format!("Failed to load model {}", path.display()))
}

fn print_report(report: &EvaluationReport) {
    println!("Evaluation over {} episodes", report.episodes());
    println!("  mean reward: {:.2}", report.stats.mean);
    println!("  max reward:  {:.2}", report.stats.max);
    println!("  min reward:  {:.2}", report.stats.min);
}

pub async fn train(args: TrainArgs) -> Result<()> {
    let mut config = QLearningConfig::load(args.config.as_deref())?;
    if let Some(episodes) = args.episodes {
        config.training.episodes = episodes;
    }
    if let Some(eval_episodes) = args.eval_episodes {
        config.training.eval_episodes = eval_episodes;
    }
    if let Some(noise_std) = args.noise_std {
        config.noise.noise_std = noise_std;
    }
    config.validate()?;

    let save = args.save.unwrap_or_else(default_model_path);
    let mut trainer = build_trainer(&config, args.seed)?.with_checkpoint_path(&save);
    if let Some(load) = &args.load {
        let actions = trainer.env_mut().action_space().n;
        let table = load_model(&config, load, actions)?;
        trainer = trainer.with_table(table)?;
        info!(path = %load.display(), "Resuming from saved model");
    }

    info!(
        model = %save.display(),
        noise_std = config.noise.noise_std,
        episodes = config.training.episodes,
        "Training agent"
    );
    let summary = trainer.train().await?;

    println!("Trained for {} episodes", summary.episodes);
    if let (Some(reward), Some(episode)) = (summary.best_reward, summary.best_episode) {
        println!("  best reward: {reward:.2} (episode {episode})");
    }
    if let Some(stats) = &summary.reward_stats {
        println!(
            "  episode reward: mean {:.2}, max {:.2}, min {:.2}",
            stats.mean, stats.max, stats.min
        );
    }
    println!("  final epsilon: {:.4}", summary.final_epsilon);
    println!(
        "  checkpoints: {} written, {} failed -> {}",
        summary.checkpoints_written,
        summary.checkpoints_failed,
        save.display()
    );
    if let Some(csv) = &summary.history_csv {
        println!("  reward history: {}", csv.display());
    }

    if args.skip_eval || config.training.eval_episodes == 0 {
        info!("Skipping evaluation");
    } else {
        let report = trainer.evaluate(config.training.eval_episodes).await?;
        print_report(&report);
    }

    trainer.env_mut().close().await?;
    Ok(())
}

pub async fn evaluate(args: EvaluateArgs) -> Result<()> {
    let mut config = QLearningConfig::load(args.config.as_deref())?;
    if let Some(noise_std) = args.noise_std {
        config.noise.noise_std = noise_std;
    }
    config.validate()?;

    let episodes = args.episodes.unwrap_or(config.training.eval_episodes);
    let mut trainer = build_trainer(&config, args.seed)?;
    let actions = trainer.env_mut().action_space().n;
    let table = load_model(&config, &args.model, actions)?;
    let mut trainer = trainer.with_table(table)?;

    info!(model = %args.model.display(), episodes, "Evaluating saved model");
    let report = trainer.evaluate(episodes).await?;
    trainer.env_mut().close().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// One random-policy episode, comparing true and noisy cart position and pole angle
pub async fn noise(args: NoiseArgs) -> Result<()> {
    let mut config = QLearningConfig::load(None)?;
    if let Some(noise_std) = args.noise_std {
        config.noise.noise_std = noise_std;
    }
    config.noise.validate()?;

    let mut env = CartPoleEnv::new(&env_config(&config, args.seed));
    let mut noise = NoisyObservation::from_config(&config.noise, args.seed.map(|s| s.wrapping_add(1)))?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
        None => StdRng::from_entropy(),
    };
    let actions = env.action_space();

    let (mut observation, _) = env.reset().await?;
    let mut squared_error = [0.0_f64; 2];
    let mut steps = 0_usize;
    loop {
        let truth = env.state();
        let noisy = noise.apply(observation);
        let seen = noisy.values();
        info!(
            step = steps,
            x = truth.x,
            noisy_x = seen[0],
            theta_deg = truth.theta.to_degrees(),
            noisy_theta_deg = seen[2].to_degrees(),
            "Observation"
        );
        squared_error[0] += (seen[0] - truth.x).powi(2);
        squared_error[1] += (seen[2] - truth.theta).to_degrees().powi(2);

        let step = env.step(actions.sample(&mut rng)).await?;
        steps += 1;
        if step.is_done() {
            break;
        }
        observation = step.observation;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = steps as f64;
    println!("Random episode lasted {steps} steps (noise_std = {})", config.noise.noise_std);
    println!("  position RMS error: {:.4}", (squared_error[0] / n).sqrt());
    println!("  angle RMS error:    {:.4} deg", (squared_error[1] / n).sqrt());
    if config.noise.noise_std == 0.0 {
        warn!("noise_std is 0, readings are exact");
    }
    Ok(())
}
