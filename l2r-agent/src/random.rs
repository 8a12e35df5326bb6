//! An agent taking uniformly random actions.
use anyhow::Result;
use l2r_core::{record::Record, ActionSample, ActionSpace, Agent, Configurable};
use l2r_env::{BoxSpace, BoxSpaceConfig, RacingAct};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

fn default_load_checkpoint_from() -> String {
    "".to_string()
}

/// Configuration of [`RandomAgent`].
///
/// The hyperparameters are shared with learning agents so that the same
/// file layout works for all of them. The random agent checks their types
/// and ignores their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomAgentConfig {
    /// Number of initial steps taking random actions.
    pub steps_to_sample_randomly: usize,

    /// Discount factor.
    pub gamma: f32,

    /// Entropy coefficient.
    pub alpha: f32,

    /// Coefficient of the soft update of target networks.
    pub polyak: f32,

    /// Learning rate.
    pub lr: f32,

    /// Path to the configuration of the actor-critic networks.
    pub actor_critic_cfg_path: String,

    /// Path of a checkpoint to load, empty for none.
    #[serde(default = "default_load_checkpoint_from")]
    pub load_checkpoint_from: String,

    /// Space from which actions are drawn.
    #[serde(default)]
    pub action_space: BoxSpaceConfig,

    /// Seed of the sampler. Unseeded when `None`.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RandomAgentConfig {
    fn default() -> Self {
        Self {
            steps_to_sample_randomly: 0,
            gamma: 0.99,
            alpha: 0.2,
            polyak: 0.995,
            lr: 0.003,
            actor_critic_cfg_path: "".to_string(),
            load_checkpoint_from: default_load_checkpoint_from(),
            action_space: BoxSpaceConfig::default(),
            seed: None,
        }
    }
}

impl RandomAgentConfig {
    /// Sets the action space.
    pub fn action_space(mut self, v: BoxSpaceConfig) -> Self {
        self.action_space = v;
        self
    }

    /// Sets the seed of the sampler.
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`RandomAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RandomAgentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Takes actions drawn uniformly from a [`BoxSpace`].
///
/// Observations are never read, so the agent works with any observation
/// type. Nothing is learned, loaded or saved.
pub struct RandomAgent {
    action_space: BoxSpace,
}

impl RandomAgent {
    /// The space from which actions are drawn.
    pub fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }
}

impl Configurable for RandomAgent {
    type Config = RandomAgentConfig;

    fn build(config: Self::Config) -> Result<Self> {
        let action_space = BoxSpace::build(&config.action_space, config.seed)?;
        Ok(Self { action_space })
    }
}

impl<O> Agent<O, RacingAct> for RandomAgent {
    fn select_action(&mut self, _obs: &O) -> ActionSample<RacingAct> {
        ActionSample::new(self.action_space.sample())
    }

    fn register_reset(&mut self, _obs: &O) {}

    fn update(&mut self, _data: &Record) -> Result<Record> {
        Ok(Record::empty())
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        debug!("Nothing to load from {:?}", path);
        Ok(())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        debug!("Nothing to save in {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2r_core::record::RecordValue;
    use tempdir::TempDir;

    const CONFIG: &str = r#"
steps_to_sample_randomly: 5000
gamma: 0.99
alpha: 0.2
polyak: 0.995
lr: 0.003
actor_critic_cfg_path: config_files/example_sac/actor_critic.yaml
"#;

    #[test]
    fn test_config_defaults() -> Result<()> {
        let config: RandomAgentConfig = serde_yaml::from_str(CONFIG)?;
        assert_eq!(config.steps_to_sample_randomly, 5000);
        assert_eq!(config.load_checkpoint_from, "");
        assert_eq!(config.action_space, BoxSpaceConfig::default());
        assert_eq!(config.seed, None);
        Ok(())
    }

    #[test]
    fn test_config_rejects_unknown_and_missing_fields() {
        let unknown = format!("{}learning_rate: 0.1\n", CONFIG);
        assert!(serde_yaml::from_str::<RandomAgentConfig>(&unknown).is_err());
        assert!(serde_yaml::from_str::<RandomAgentConfig>("gamma: 0.99\n").is_err());
    }

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = RandomAgentConfig::default().seed(Some(1));
        let dir = TempDir::new("random_agent_config")?;
        let path = dir.path().join("agent.yaml");
        config.save(&path)?;
        assert_eq!(RandomAgentConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_actions_within_space() -> Result<()> {
        let space = BoxSpaceConfig {
            low: vec![-0.3, -1.0],
            high: vec![0.3, 6.0],
        };
        let mut agent = RandomAgent::build(RandomAgentConfig::default().action_space(space))?;

        for _ in 0..1000 {
            let act = Agent::<(), RacingAct>::select_action(&mut agent, &()).action;
            assert!(agent.action_space().contains(&act));
        }
        Ok(())
    }

    #[test]
    fn test_observation_is_never_read() -> Result<()> {
        let mut agent = RandomAgent::build(RandomAgentConfig::default())?;

        let nan = vec![f32::NAN; 3];
        let empty: Vec<f32> = vec![];
        let a1 = agent.select_action(&nan);
        let a2 = agent.select_action(&empty);
        agent.register_reset(&nan);

        assert_eq!(a1.action.len(), 2);
        assert_eq!(a2.action.len(), 2);
        assert!(a1.info.is_none());
        Ok(())
    }

    #[test]
    fn test_seeded_agents_agree() -> Result<()> {
        let config = RandomAgentConfig::default().seed(Some(42));
        let mut a1 = RandomAgent::build(config.clone())?;
        let mut a2 = RandomAgent::build(config)?;

        for _ in 0..10 {
            assert_eq!(
                Agent::<(), RacingAct>::select_action(&mut a1, &()).action,
                Agent::<(), RacingAct>::select_action(&mut a2, &()).action
            );
        }
        Ok(())
    }

    #[test]
    fn test_update_returns_empty_record() -> Result<()> {
        let mut agent = RandomAgent::build(RandomAgentConfig::default())?;
        let data = Record::from_slice(&[("reward", RecordValue::Scalar(1.0))]);
        assert!(Agent::<(), RacingAct>::update(&mut agent, &data)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_save_nonexistent_paths() -> Result<()> {
        let dir = TempDir::new("random_agent")?;
        let path = dir.path().join("does/not/exist");
        let mut agent = RandomAgent::build(RandomAgentConfig::default())?;

        Agent::<(), RacingAct>::load_model(&mut agent, &path)?;
        Agent::<(), RacingAct>::save_model(&agent, &path)?;

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
