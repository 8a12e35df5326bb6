//! A recorder logging runs of l2r to [MLflow](https://mlflow.org) tracking.
//!
//! Before running the program using this crate, run a tracking server with the following command:
//!
//! ```bash
//! mlflow server --host 127.0.0.1 --port 8080
//! ```
//!
//! Configurations are logged as parameters of a run. Nested configuration
//! parameters are flattened, logged like `agent.gamma` or `env.max_timesteps`.
//! Scalars in records are logged as metrics.
//!
//! ```no_run
//! use anyhow::Result;
//! use l2r_core::record::{Record, RecordValue, Recorder};
//! use l2r_mlflow_tracking::MlflowTrackingClient;
//! use serde::Serialize;
//!
//! #[derive(Debug, Serialize)]
//! struct Config {
//!     agent_kind: String,
//!     hyper_params: HyperParameters,
//! }
//!
//! #[derive(Debug, Serialize)]
//! struct HyperParameters {
//!     gamma: f32,
//!     lr: f32,
//! }
//!
//! fn main() -> Result<()> {
//!     env_logger::init();
//!
//!     let config = Config {
//!         agent_kind: "RandomAgent".to_string(),
//!         hyper_params: HyperParameters { gamma: 0.99, lr: 0.003 },
//!     };
//!
//!     let client = MlflowTrackingClient::new("http://localhost:8080").set_experiment("l2r")?;
//!     let mut recorder = client.create_recorder("")?;
//!     recorder.log_params(&config)?;
//!
//!     for episode in 0..10 {
//!         let mut record = Record::empty();
//!         record.insert("step", RecordValue::Scalar(episode as f32));
//!         record.insert("episode_return", RecordValue::Scalar(episode as f32 * 0.5));
//!         recorder.write(record);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Videos
//!
//! Videos in records are saved as GIF files in the artifact directory of the
//! run. The tracking server is assumed to run on the same host: artifact URIs
//! `mlflow-artifacts:/...` are resolved against the `MLFLOW_DEFAULT_ARTIFACT_ROOT`
//! environment variable of the program using this crate, not the one of the
//! tracking server.
mod client;
mod experiment;
mod recorder;
mod run;
use anyhow::{anyhow, Result};
pub use client::MlflowTrackingClient;
pub use experiment::{Experiment, ExperimentTag};
pub use recorder::MlflowTrackingRecorder;
pub use run::{Run, RunInfo};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn system_time_as_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Flattens a serializable object into `(key, value)` pairs.
///
/// Nested keys are joined with `.` and strings are not quoted.
pub fn flatten_params(params: impl Serialize) -> Result<Vec<(String, String)>> {
    let map = match serde_json::to_value(params)? {
        Value::Object(map) => map,
        v => return Err(anyhow!("Parameters must be an object, got {}", v)),
    };
    let mut params: Vec<_> = flatten_serde_json::flatten(&map)
        .into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => (k, s),
            v => (k, v.to_string()),
        })
        .collect();
    params.sort();
    Ok(params)
}

/// Resolves the local directory of an artifact URI.
///
/// `mlflow-artifacts:/` URIs are resolved against `root`, `file://` URIs and
/// plain paths are used as they are. Other schemes are not supported.
pub(crate) fn artifact_dir(uri: &str, root: Option<&Path>) -> Result<PathBuf> {
    if let Some(rest) = uri.strip_prefix("mlflow-artifacts:/") {
        let root =
            root.ok_or_else(|| anyhow!("MLFLOW_DEFAULT_ARTIFACT_ROOT must be set for {}", uri))?;
        Ok(root.join(rest.trim_start_matches('/')))
    } else if let Some(rest) = uri.strip_prefix("file://") {
        Ok(PathBuf::from(rest))
    } else if !uri.contains("://") {
        Ok(PathBuf::from(uri))
    } else {
        Err(anyhow!("Unsupported artifact URI: {}", uri))
    }
}
