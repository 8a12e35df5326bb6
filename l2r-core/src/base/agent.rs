//! Agent.
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// An action selected by an [`Agent`], with optional metadata.
///
/// A sample is created fresh at every decision step and consumed once by
/// the environment.
#[derive(Clone, Debug)]
pub struct ActionSample<A> {
    /// The action applied to the environment.
    pub action: A,

    /// Auxiliary values like log-probabilities or exploration flags.
    pub info: Option<Record>,
}

impl<A> ActionSample<A> {
    /// Wraps an action without metadata.
    pub fn new(action: A) -> Self {
        Self { action, info: None }
    }
}

impl<A> From<A> for ActionSample<A> {
    fn from(action: A) -> Self {
        Self::new(action)
    }
}

/// A decision-making entity interacting with an environment.
///
/// `O` is the observation the agent receives and `A` is the action it emits.
pub trait Agent<O, A> {
    /// Selects an action given an observation.
    fn select_action(&mut self, obs: &O) -> ActionSample<A>;

    /// Notifies the agent that an episode started with the given observation.
    fn register_reset(&mut self, obs: &O);

    /// Updates the agent with the data of a transition.
    ///
    /// The returned record holds values describing the update, like losses.
    /// It is empty when there is nothing to report.
    fn update(&mut self, data: &Record) -> Result<Record>;

    /// Loads the model from the given path.
    fn load_model(&mut self, path: &Path) -> Result<()>;

    /// Saves the model to the given path.
    fn save_model(&self, path: &Path) -> Result<()>;
}

impl<O, A, T> Agent<O, A> for Box<T>
where
    T: Agent<O, A> + ?Sized,
{
    fn select_action(&mut self, obs: &O) -> ActionSample<A> {
        (**self).select_action(obs)
    }

    fn register_reset(&mut self, obs: &O) {
        (**self).register_reset(obs)
    }

    fn update(&mut self, data: &Record) -> Result<Record> {
        (**self).update(data)
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        (**self).load_model(path)
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        (**self).save_model(path)
    }
}
