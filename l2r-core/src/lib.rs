#![warn(missing_docs)]
//! Core abstractions of the racing-agent harness.
//!
//! The crate defines the contracts between the pieces of an experiment:
//!
//! * [`Env`] is the simulator contract, emitting raw observations.
//! * [`EpisodicEnv`] is what a training loop drives, typically a container
//!   adapting an [`Env`] to the observations agents expect.
//! * [`Agent`] selects actions and reacts to episode boundaries.
//! * [`ActionSpace`] samples valid actions.
//! * [`record`] holds metrics and videos, and the recorders writing them out.
//! * [`Runner`] and [`DefaultEvaluator`] run episodes.
pub mod error;
pub mod record;

mod base;
pub use base::{
    Act, ActionSample, ActionSpace, Agent, Configurable, Env, EpisodicEnv, Info, Obs, Step,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod runner;
pub use runner::{Runner, RunnerConfig};
