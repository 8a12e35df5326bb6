//! Configuration of an experiment.
use anyhow::Result;
use l2r_agent::{AgentConfig, RandomAgentConfig};
use l2r_core::RunnerConfig;
use l2r_env::{EncoderConfig, RacingEnvConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Destination of the metrics of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerConfig {
    /// TFRecord files in the experiment directory.
    Tensorboard,

    /// A MLflow tracking server.
    Mlflow {
        /// Base URL of the server, like `http://localhost:8080`.
        url: String,

        /// Name of the MLflow experiment.
        experiment: String,
    },
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::Tensorboard
    }
}

/// Configuration of an experiment.
///
/// ```yaml
/// seed: 42
/// runner:
///   experiment_name: random_baseline
///   model_save_path: ./models
///   n_episodes: 10
/// env:
///   env:
///     max_timesteps: 5000
/// encoder:
///   kind: downsample
///   size: 8
/// agent:
///   agent_kind: RandomAgent
///   config:
///     steps_to_sample_randomly: 5000
///     ...
/// tracker:
///   kind: tensorboard
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Seed of the simulator.
    pub seed: i64,

    /// Episode loop and experiment directory.
    pub runner: RunnerConfig,

    /// Simulator.
    pub env: RacingEnvConfig,

    /// Encoder of camera images.
    pub encoder: EncoderConfig,

    /// Agent built by the registry.
    pub agent: AgentConfig,

    /// Destination of metrics.
    pub tracker: TrackerConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let random_agent = serde_yaml::to_value(RandomAgentConfig::default())
            .unwrap_or(serde_yaml::Value::Null);
        Self {
            seed: 42,
            runner: RunnerConfig::default(),
            env: RacingEnvConfig::default(),
            encoder: EncoderConfig::default(),
            agent: AgentConfig {
                agent_kind: "RandomAgent".to_string(),
                config: random_agent,
            },
            tracker: TrackerConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
