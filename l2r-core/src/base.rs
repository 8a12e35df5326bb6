//! Core functionalities.
mod action_space;
mod agent;
mod env;
mod policy;
mod step;
pub use action_space::ActionSpace;
pub use agent::{ActionSample, Agent};
pub use env::{Env, EpisodicEnv};
pub use policy::Configurable;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Vectorized environments are not supported, so an object implementing
/// this trait always holds a single observation.
pub trait Obs: Clone + Debug {}

/// An action of an environment.
pub trait Act: Clone + Debug {}
