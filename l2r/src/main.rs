use anyhow::Result;
use clap::Parser;
use l2r::{run_experiment, ExperimentConfig, TrackerConfig};
use l2r_agent::AgentConfig;
use log::info;
use std::path::PathBuf;

/// Run an agent in the racing simulator
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Experiment config file, defaults are used when not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Agent config file, overriding the agent in the experiment config
    #[arg(short, long)]
    agent: Option<PathBuf>,

    /// Log metrics to the MLflow tracking server at this URL
    #[arg(short, long)]
    mlflow: Option<String>,

    /// Number of episodes, overriding the experiment config
    #[arg(short, long)]
    n_episodes: Option<usize>,

    /// Model checkpoint loaded by the agent before the run
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Branch and commit of the code, written to the experiment directory
    run_info: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(path) = &args.agent {
        config.agent = AgentConfig::load(path)?;
    }
    if let Some(url) = args.mlflow {
        config.tracker = TrackerConfig::Mlflow {
            url,
            experiment: config.runner.experiment_name.clone(),
        };
    }
    if let Some(n) = args.n_episodes {
        config.runner = config.runner.n_episodes(n);
    }

    let returns = run_experiment(&config, &args.run_info, args.checkpoint.as_deref())?;
    let mean = returns.iter().sum::<f32>() / returns.len().max(1) as f32;
    info!("{} episodes, mean return = {}", returns.len(), mean);

    Ok(())
}
