use anyhow::Result;
use l2r_core::record::{AggregateRecorder, Record, RecordValue, Recorder};
use l2r_mlflow_tracking::MlflowTrackingClient;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Config {
    agent_kind: String,
    hyper_params: HyperParameters,
}

#[derive(Debug, Serialize)]
struct HyperParameters {
    gamma: f32,
    lr: f32,
    steps_to_sample_randomly: usize,
}

fn config(lr: f32) -> Config {
    Config {
        agent_kind: "RandomAgent".to_string(),
        hyper_params: HyperParameters {
            gamma: 0.99,
            lr,
            steps_to_sample_randomly: 5000,
        },
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let client = MlflowTrackingClient::new("http://localhost:8080").set_experiment("l2r")?;
    let mut recorder_run1 = client.create_recorder("")?;
    let mut recorder_run2 = client.create_recorder("")?;
    recorder_run1.log_params(&config(0.003))?;
    recorder_run2.log_params(&config(0.01))?;

    // Metrics written directly
    for episode in 0..100 {
        let mut record = Record::empty();
        record.insert("step", RecordValue::Scalar(episode as f32));
        record.insert("episode_return", RecordValue::Scalar((episode as f32).sqrt()));
        recorder_run1.write(record);
    }

    // Metrics aggregated over 10 episodes
    for episode in 0..100 {
        recorder_run2.store(Record::from_scalar("episode_return", (episode as f32).ln_1p()));
        if (episode + 1) % 10 == 0 {
            recorder_run2.flush(episode);
        }
    }

    Ok(())
}
