//! Configuration of [`Runner`](super::Runner).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`Runner`](super::Runner).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    /// Name of the experiment, also the name of the directory of its outputs.
    pub experiment_name: String,

    /// Directory under which the outputs of experiments are saved.
    pub model_save_path: String,

    /// The number of episodes to run.
    pub n_episodes: usize,

    /// The maximum number of steps in an episode, `None` for no limit.
    pub max_episode_steps: Option<usize>,

    /// If `true`, episodes start from random positions.
    pub random_pos: bool,

    /// Interval of flushing aggregated records in episodes.
    pub record_interval: usize,

    /// If `true`, the model of the agent is saved at the end of the run.
    pub save_model: bool,

    /// The number of evaluation episodes after the run.
    pub n_eval_episodes: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            experiment_name: "l2r".to_string(),
            model_save_path: "./models".to_string(),
            n_episodes: 1,
            max_episode_steps: None,
            random_pos: false,
            record_interval: 1,
            save_model: true,
            n_eval_episodes: 0,
        }
    }
}

impl RunnerConfig {
    /// Sets the name of the experiment.
    pub fn experiment_name(mut self, v: impl Into<String>) -> Self {
        self.experiment_name = v.into();
        self
    }

    /// Sets the directory under which outputs are saved.
    pub fn model_save_path(mut self, v: impl Into<String>) -> Self {
        self.model_save_path = v.into();
        self
    }

    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets if episodes start from random positions.
    pub fn random_pos(mut self, v: bool) -> Self {
        self.random_pos = v;
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Sets if the model is saved at the end of the run.
    pub fn save_model(mut self, v: bool) -> Self {
        self.save_model = v;
        self
    }

    /// Sets the number of evaluation episodes.
    pub fn n_eval_episodes(mut self, v: usize) -> Self {
        self.n_eval_episodes = v;
        self
    }

    /// `<model_save_path>/<experiment_name>`.
    pub fn experiment_dir(&self) -> PathBuf {
        Path::new(&self.model_save_path).join(&self.experiment_name)
    }

    /// Constructs [`RunnerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RunnerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
