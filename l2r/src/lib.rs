//! Runs racing agents in a simulator and tracks the experiments.
//!
//! An experiment is described by an [`ExperimentConfig`] YAML file: the
//! runner, the racing environment, the observation encoder, the agent and
//! the destination of metrics. [`run_experiment`] builds all of them and
//! runs the episodes.
mod config;
mod experiment;
pub use config::{ExperimentConfig, TrackerConfig};
pub use experiment::{build_container, create_recorder, run_experiment, Container};
