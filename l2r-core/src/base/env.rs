//! Environment.
use super::{Act, ActionSample, Info, Obs, Step};
use anyhow::Result;

/// Represents a simulator environment.
///
/// Calls are synchronous: [`Env::reset`] and [`Env::step`] block until the
/// simulator responds. Errors raised by the simulator, for example for a
/// malformed action, are returned unchanged to the caller.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    ///
    /// When `random_pos` is `true`, the environment is asked to start the
    /// episode from a random pose. Environments without that capability
    /// may ignore the flag.
    fn reset(&mut self, random_pos: bool) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;
}

/// An environment as seen by a training loop.
///
/// Observations are the ones given to agents, which may differ from the raw
/// observations of the simulator. [`Runner`](crate::Runner) and
/// [`DefaultEvaluator`](crate::DefaultEvaluator) drive objects implementing
/// this trait.
pub trait EpisodicEnv {
    /// Observation given to agents.
    type Obs;

    /// Action taken from agents.
    type Act;

    /// Information returned at every step.
    type Info;

    /// Starts a new episode and returns the initial observation.
    fn reset_episode(&mut self, random_pos: bool) -> Result<Self::Obs>;

    /// Applies an action and returns `(next_obs, reward, done, info)`.
    fn step_episode(
        &mut self,
        act: &ActionSample<Self::Act>,
    ) -> Result<(Self::Obs, f32, bool, Self::Info)>;

    /// Called once after the last episode of a run.
    ///
    /// Does nothing in the default implementation.
    fn finish(&mut self) {}
}
