//! Evaluate [`Agent`].
use crate::{record::Record, Agent, EpisodicEnv};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate [`Agent`].
pub trait Evaluator<E: EpisodicEnv> {
    /// Evaluate [`Agent`] on the given environment.
    ///
    /// The agent is not updated during evaluation.
    fn evaluate<A>(&mut self, env: &mut E, agent: &mut A) -> Result<Record>
    where
        A: Agent<E::Obs, E::Act> + ?Sized;
}
