//! Construction of agents by name.
use crate::RandomAgent;
use anyhow::Result;
use l2r_core::{error::L2rError, Agent, Configurable};
use l2r_env::RacingAct;
use log::info;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

/// A YAML file selecting an agent and configuring it.
///
/// ```yaml
/// agent_kind: RandomAgent
/// config:
///   steps_to_sample_randomly: 5000
///   gamma: 0.99
///   ...
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name under which the agent is registered.
    pub agent_kind: String,

    /// Configuration given to the agent.
    pub config: Value,
}

impl AgentConfig {
    /// Constructs [`AgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }
}

type Factory<O, A> = Box<dyn Fn(&Value) -> Result<Box<dyn Agent<O, A>>>>;

/// Maps names to constructors of agents.
///
/// Agents are selected at runtime from [`AgentConfig`] files. Each
/// constructor checks the configuration against the typed config of its
/// agent before building it.
pub struct AgentRegistry<O, A> {
    factories: BTreeMap<String, Factory<O, A>>,
}

impl<O: 'static, A: 'static> Default for AgentRegistry<O, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: 'static, A: 'static> AgentRegistry<O, A> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a constructor, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Agent<O, A>>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registers an agent built from its typed configuration.
    ///
    /// Configurations that do not deserialize into `T::Config` are rejected
    /// with [`L2rError::InvalidAgentConfig`].
    pub fn register_configurable<T>(&mut self, name: impl Into<String>)
    where
        T: Configurable + Agent<O, A> + 'static,
    {
        let name = name.into();
        let name_ = name.clone();
        self.register(name, move |value| {
            let config: T::Config = serde_yaml::from_value(value.clone()).map_err(|e| {
                L2rError::InvalidAgentConfig {
                    name: name_.clone(),
                    reason: e.to_string(),
                }
            })?;
            Ok(Box::new(T::build(config)?) as Box<dyn Agent<O, A>>)
        });
    }

    /// Builds the agent registered under `name`.
    pub fn build(&self, name: &str, config: &Value) -> Result<Box<dyn Agent<O, A>>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| L2rError::UnknownAgent(name.to_string()))?;
        let agent = factory(config)?;
        info!("Built agent '{}'", name);
        Ok(agent)
    }

    /// Builds the agent described by an [`AgentConfig`].
    pub fn build_from_config(&self, config: &AgentConfig) -> Result<Box<dyn Agent<O, A>>> {
        self.build(&config.agent_kind, &config.config)
    }

    /// Builds the agent described by the [`AgentConfig`] file at `path`.
    pub fn build_from_path(&self, path: impl AsRef<Path>) -> Result<Box<dyn Agent<O, A>>> {
        self.build_from_config(&AgentConfig::load(path)?)
    }

    /// Registered names in lexicographic order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(|k| k.as_str()).collect()
    }
}

impl<O: 'static> AgentRegistry<O, RacingAct> {
    /// Creates a registry with the agents of this crate.
    ///
    /// * `"RandomAgent"`: [`RandomAgent`].
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_configurable::<RandomAgent>("RandomAgent");
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2r_core::ActionSpace;
    use l2r_env::BoxSpace;
    use std::io::Write;
    use tempdir::TempDir;

    const AGENT_YAML: &str = r#"
agent_kind: RandomAgent
config:
  steps_to_sample_randomly: 5000
  gamma: 0.99
  alpha: 0.2
  polyak: 0.995
  lr: 0.003
  actor_critic_cfg_path: actor_critic.yaml
  action_space:
    low: [-0.3, -1.0]
    high: [0.3, 6.0]
  seed: 42
"#;

    fn registry() -> AgentRegistry<(), RacingAct> {
        AgentRegistry::with_builtin()
    }

    #[test]
    fn test_build_from_path() -> Result<()> {
        let dir = TempDir::new("agent_registry")?;
        let path = dir.path().join("agent.yaml");
        File::create(&path)?.write_all(AGENT_YAML.as_bytes())?;

        let mut agent = registry().build_from_path(&path)?;
        let space = BoxSpace::new(vec![-0.3, -1.0], vec![0.3, 6.0])?;
        for _ in 0..100 {
            assert!(space.contains(&agent.select_action(&()).action));
        }
        Ok(())
    }

    #[test]
    fn test_unknown_agent() {
        let err = registry().build("SACAgent", &Value::Null).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<L2rError>(),
            Some(L2rError::UnknownAgent(name)) if name == "SACAgent"
        ));
    }

    #[test]
    fn test_invalid_config() -> Result<()> {
        let config: AgentConfig =
            serde_yaml::from_str("agent_kind: RandomAgent\nconfig:\n  gamma: fast\n")?;
        let err = registry().build_from_config(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<L2rError>(),
            Some(L2rError::InvalidAgentConfig { name, .. }) if name == "RandomAgent"
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_action_space() -> Result<()> {
        let yaml = AGENT_YAML.replace("high: [0.3, 6.0]", "high: [0.3]");
        let config: AgentConfig = serde_yaml::from_str(&yaml)?;
        let err = registry().build_from_config(&config).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<L2rError>(),
            Some(L2rError::InvalidActionSpace(_))
        ));
        Ok(())
    }

    #[test]
    fn test_register_custom_agent() -> Result<()> {
        let mut registry = registry();
        registry.register("AlwaysRandom", |_| {
            let agent = RandomAgent::build(Default::default())?;
            Ok(Box::new(agent) as Box<dyn Agent<(), RacingAct>>)
        });

        assert_eq!(registry.names(), vec!["AlwaysRandom", "RandomAgent"]);
        assert!(registry.build("AlwaysRandom", &Value::Null).is_ok());
        Ok(())
    }
}
