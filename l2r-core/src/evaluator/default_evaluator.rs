//! Default implementation of the [`Evaluator`] trait.
//!
//! Runs a fixed number of episodes and calculates the average return.
use super::Evaluator;
use crate::{record::Record, Agent, EpisodicEnv};
use anyhow::Result;
use log::info;

/// Runs a fixed number of episodes and averages their returns.
///
/// The result is recorded as `"Episode return"`.
///
/// # Examples
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::new(5).max_episode_steps(Some(1000));
/// let record = evaluator.evaluate(&mut container, &mut agent)?;
/// println!("Average return: {}", record.get_scalar("Episode return")?);
/// ```
pub struct DefaultEvaluator {
    n_episodes: usize,
    random_pos: bool,
    max_episode_steps: Option<usize>,
}

impl DefaultEvaluator {
    /// Constructs a new [`DefaultEvaluator`] running `n_episodes` episodes.
    pub fn new(n_episodes: usize) -> Self {
        Self {
            n_episodes,
            random_pos: false,
            max_episode_steps: None,
        }
    }

    /// Sets if episodes start from random positions.
    pub fn random_pos(mut self, v: bool) -> Self {
        self.random_pos = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }
}

impl<E: EpisodicEnv> Evaluator<E> for DefaultEvaluator {
    fn evaluate<A>(&mut self, env: &mut E, agent: &mut A) -> Result<Record>
    where
        A: Agent<E::Obs, E::Act> + ?Sized,
    {
        let mut r_total = 0f32;

        for ix in 0..self.n_episodes {
            let mut prev_obs = env.reset_episode(self.random_pos)?;
            agent.register_reset(&prev_obs);
            let mut r_episode = 0f32;
            let mut steps = 0;

            loop {
                let act = agent.select_action(&prev_obs);
                let (obs, reward, done, _) = env.step_episode(&act)?;
                r_episode += reward;
                steps += 1;
                let truncated = self.max_episode_steps.map_or(false, |m| steps >= m);
                if done || truncated {
                    break;
                }
                prev_obs = obs;
            }

            info!("Eval episode {}, {} steps, return = {}", ix, steps, r_episode);
            r_total += r_episode;
        }

        let n = self.n_episodes.max(1) as f32;
        Ok(Record::from_scalar("Episode return", r_total / n))
    }
}
