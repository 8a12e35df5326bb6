//! Agents for racing environments.
//!
//! Agents are built by name through the [`AgentRegistry`], from YAML files
//! in the form of [`AgentConfig`].
mod random;
mod registry;
pub use random::{RandomAgent, RandomAgentConfig};
pub use registry::{AgentConfig, AgentRegistry};
