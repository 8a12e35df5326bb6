//! Run episodes of an [`Agent`] on an [`EpisodicEnv`].
mod config;
use crate::{
    record::{AggregateRecorder, Record, RecordValue},
    Agent, EpisodicEnv,
};
use anyhow::Result;
pub use config::RunnerConfig;
use log::{debug, info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Drives episodes and records their metrics.
///
/// # Episode loop
///
/// For every episode:
///
/// 1. Reset the environment and call [`Agent::register_reset`] with the
///    initial observation.
/// 2. Repeat until the environment reports `done` or `max_episode_steps`
///    is reached:
///     1. Select an action with [`Agent::select_action`].
///     2. Apply it to the environment.
///     3. Call [`Agent::update`] with a record of the transition, holding
///        `"obs"`, `"act"`, `"reward"`, `"next_obs"` and `"done"`.
///        Non-empty records returned by the agent are stored in the recorder.
/// 3. Store `"episode"`, `"episode_return"`, `"episode_steps"` and
///    `"episode_secs"` in the recorder. Every `record_interval` episodes the
///    recorder is flushed with the episode index as step.
///
/// After the last episode, [`EpisodicEnv::finish`] is called and, if
/// configured, the model is saved in `<model_save_path>/<experiment_name>`.
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Constructs a runner.
    pub fn build(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// The configuration of the runner.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The directory of the outputs of the experiment.
    pub fn experiment_dir(&self) -> PathBuf {
        self.config.experiment_dir()
    }

    /// Writes the given arguments, separated by spaces, to
    /// `<experiment_dir>/git_config` and returns the path of the file.
    ///
    /// The arguments are typically the branch and commit of the code used
    /// in the run.
    pub fn write_run_info(&self, args: &[String]) -> Result<PathBuf> {
        let dir = self.experiment_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join("git_config");
        fs::write(&path, args.join(" "))?;
        info!("Wrote run info to {:?}", &path);
        Ok(path)
    }

    fn save_model<O, A, G>(agent: &G, model_dir: &Path)
    where
        G: Agent<O, A> + ?Sized,
    {
        match agent.save_model(model_dir) {
            Ok(()) => info!("Saved the model in {:?}.", model_dir),
            Err(e) => warn!("Failed to save model in {:?}: {}", model_dir, e),
        }
    }

    fn run_episode<E, G, R>(
        &mut self,
        env: &mut E,
        agent: &mut G,
        recorder: &mut R,
    ) -> Result<(f32, usize)>
    where
        E: EpisodicEnv,
        E::Obs: Clone + Into<RecordValue>,
        E::Act: Clone + Into<RecordValue>,
        G: Agent<E::Obs, E::Act> + ?Sized,
        R: AggregateRecorder + ?Sized,
    {
        let mut obs = env.reset_episode(self.config.random_pos)?;
        agent.register_reset(&obs);
        let mut r_total = 0f32;
        let mut steps = 0;

        loop {
            let act = agent.select_action(&obs);
            let (next_obs, reward, done, _info) = env.step_episode(&act)?;
            r_total += reward;
            steps += 1;

            let mut data = Record::empty();
            data.insert("obs", obs.into());
            data.insert("act", act.action.into());
            data.insert("reward", RecordValue::Scalar(reward));
            data.insert("next_obs", next_obs.clone().into());
            data.insert("done", RecordValue::Scalar(if done { 1.0 } else { 0.0 }));
            let record = agent.update(&data)?;
            if !record.is_empty() {
                recorder.store(record);
            }

            obs = next_obs;
            let truncated = self.config.max_episode_steps.map_or(false, |m| steps >= m);
            if done || truncated {
                debug!("Episode ends, done = {}, truncated = {}", done, truncated);
                break;
            }
        }

        Ok((r_total, steps))
    }

    /// Runs the episodes and returns the return of each episode.
    pub fn run<E, G, R>(&mut self, env: &mut E, agent: &mut G, recorder: &mut R) -> Result<Vec<f32>>
    where
        E: EpisodicEnv,
        E::Obs: Clone + Into<RecordValue>,
        E::Act: Clone + Into<RecordValue>,
        G: Agent<E::Obs, E::Act> + ?Sized,
        R: AggregateRecorder + ?Sized,
    {
        let record_interval = self.config.record_interval.max(1);
        let mut returns = Vec::with_capacity(self.config.n_episodes);
        let mut n_pending = 0;

        info!(
            "Start experiment '{}', {} episodes",
            self.config.experiment_name, self.config.n_episodes
        );

        for episode in 0..self.config.n_episodes {
            let timer = SystemTime::now();
            let (r_total, steps) = self.run_episode(env, agent, recorder)?;
            let secs = timer.elapsed()?.as_secs_f32();
            info!(
                "Episode {:?}, {:?} steps, return = {:?}",
                episode, steps, r_total
            );

            recorder.store(Record::from_slice(&[
                ("episode", RecordValue::Scalar(episode as _)),
                ("episode_return", RecordValue::Scalar(r_total)),
                ("episode_steps", RecordValue::Scalar(steps as _)),
                ("episode_secs", RecordValue::Scalar(secs)),
            ]));
            n_pending += 1;
            if n_pending == record_interval {
                recorder.flush(episode as _);
                n_pending = 0;
            }

            returns.push(r_total);
        }

        if n_pending > 0 {
            recorder.flush(self.config.n_episodes as i64 - 1);
        }
        env.finish();

        if self.config.save_model {
            Self::save_model::<E::Obs, E::Act, G>(agent, &self.experiment_dir());
        }

        Ok(returns)
    }
}
