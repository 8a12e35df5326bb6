//! Running an experiment end-to-end.
use crate::{ExperimentConfig, TrackerConfig};
use anyhow::Result;
use l2r_agent::AgentRegistry;
use l2r_core::{
    record::{AggregateRecorder, AsyncRecorder, GifRecorder, Recorder},
    DefaultEvaluator, Env as _, Evaluator as _, Runner,
};
use l2r_env::{EncodedState, EnvContainer, MockRacingEnv, RacingAct};
use l2r_mlflow_tracking::MlflowTrackingClient;
use l2r_tensorboard::TensorboardRecorder;
use log::info;
use std::path::Path;

/// The container driven by experiments.
pub type Container = EnvContainer<MockRacingEnv>;

/// Builds the simulator and its container.
///
/// Episode videos are saved as GIF files in `video_dir` by a worker thread.
pub fn build_container(config: &ExperimentConfig, video_dir: &Path) -> Result<Container> {
    let env = MockRacingEnv::build(&config.env, config.seed)?;
    let videos: Box<dyn Recorder> = Box::new(AsyncRecorder::new(GifRecorder::new(video_dir)));
    Ok(EnvContainer::new(config.encoder.build(), videos).with_env(env))
}

/// Creates the recorder of metrics.
pub fn create_recorder(config: &ExperimentConfig) -> Result<Box<dyn AggregateRecorder>> {
    match &config.tracker {
        TrackerConfig::Tensorboard => Ok(Box::new(TensorboardRecorder::new(
            config.runner.experiment_dir(),
        ))),
        TrackerConfig::Mlflow { url, experiment } => {
            let client = MlflowTrackingClient::new(url).set_experiment(experiment)?;
            let recorder = client.create_recorder(&config.runner.experiment_name)?;
            recorder.log_params(config)?;
            recorder.set_tag("agent", &config.agent.agent_kind)?;
            Ok(Box::new(recorder))
        }
    }
}

/// Runs the episodes of an experiment and returns their returns.
///
/// `run_info`, typically the branch and the commit of the code, is written
/// to the experiment directory first. If `checkpoint` is given, the agent
/// loads its model from there before the first episode. After the run,
/// `n_eval_episodes` episodes are evaluated if configured.
pub fn run_experiment(
    config: &ExperimentConfig,
    run_info: &[String],
    checkpoint: Option<&Path>,
) -> Result<Vec<f32>> {
    let mut runner = Runner::build(config.runner.clone());
    runner.write_run_info(run_info)?;

    let registry = AgentRegistry::<EncodedState, RacingAct>::with_builtin();
    let mut agent = registry.build_from_config(&config.agent)?;
    if let Some(path) = checkpoint {
        agent.load_model(path)?;
    }

    let mut container = build_container(config, &runner.experiment_dir().join("videos"))?;
    let mut recorder = create_recorder(config)?;
    let returns = runner.run(&mut container, &mut agent, &mut recorder)?;

    let n_eval_episodes = config.runner.n_eval_episodes;
    if n_eval_episodes > 0 {
        let mut evaluator = DefaultEvaluator::new(n_eval_episodes)
            .random_pos(config.runner.random_pos)
            .max_episode_steps(config.runner.max_episode_steps);
        let record = evaluator.evaluate(&mut container, &mut agent)?;
        info!("Evaluation: {:?}", record.get_scalar("Episode return"));
        recorder.store(record);
        recorder.flush(config.runner.n_episodes as i64);
        container.flush_video();
    }

    Ok(returns)
}
