// qlearnctl: train and evaluate a tabular Q-learning agent on noisy cart-pole

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "qlearnctl")]
#[command(about = "Tabular Q-learning for cart-pole with noisy sensors", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent, checkpointing the best table, then evaluate it
    Train(TrainArgs),

    /// Greedily evaluate a saved model
    Evaluate(EvaluateArgs),

    /// Run one random episode and compare true and noisy readings
    Noise(NoiseArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Standard deviation of the sensor noise
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Continue training from this model file
    #[arg(long)]
    pub load: Option<PathBuf>,

    /// Where to write checkpoints (default: q_learning_<timestamp>.bin)
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// TOML file overriding the default configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long)]
    pub episodes: Option<usize>,

    /// Number of greedy test episodes after training
    #[arg(long)]
    pub eval_episodes: Option<usize>,

    /// Seed for the environment, noise and exploration
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not evaluate after training
    #[arg(long)]
    pub skip_eval: bool,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Model file to evaluate
    #[arg(short, long)]
    pub model: PathBuf,

    /// Standard deviation of the sensor noise
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Number of test episodes
    #[arg(short = 'n', long)]
    pub episodes: Option<usize>,

    /// TOML file overriding the default configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for the environment and noise
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct NoiseArgs {
    /// Standard deviation of the sensor noise
    #[arg(long)]
    pub noise_std: Option<f64>,

    /// Seed for the environment, noise and actions
    #[arg(long)]
    pub seed: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => commands::train(args).await,
        Commands::Evaluate(args) => commands::evaluate(args).await,
        Commands::Noise(args) => commands::noise(args).await,
    }
}
