use crate::{artifact_dir, client::Connection, flatten_params, system_time_as_millis, Run};
use anyhow::Result;
use chrono::{DateTime, Duration, Local, SecondsFormat};
use l2r_core::record::{
    AggregateRecorder, GifRecorder, Record, RecordStorage, RecordValue, Recorder,
};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct LogParamParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct LogMetricParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: i64,
}

#[derive(Debug, Serialize)]
struct UpdateRunParams<'a> {
    run_id: &'a str,
    status: &'a str,
    end_time: i64,
    run_name: &'a str,
}

#[derive(Debug, Serialize)]
struct SetTagParams<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

/// Record metrics of a run to the MLflow tracking server.
///
/// Before running episodes, [`MlflowTrackingRecorder::log_params()`] logs
/// parameters of the run like the configurations of the agent and the
/// environment.
///
/// [`Recorder::write()`] logs [`RecordValue::Scalar`] values in the record
/// as metrics. The value under the step key, `"step"` by default, is used as
/// the `step` field of Mlflow's metric data
/// (<https://mlflow.org/docs/latest/rest-api.html#metric>). Videos are saved
/// as GIF files under `videos/` in the artifact directory of the run.
/// Other types of values are ignored.
///
/// Failures of requests to the tracking server are logged and do not stop
/// the run. When dropped, the status of the run is updated to "FINISHED"
/// (<https://mlflow.org/docs/latest/rest-api.html#mlflowrunstatus>).
pub struct MlflowTrackingRecorder {
    conn: Connection,
    run_id: String,
    run_name: String,
    storage: RecordStorage,
    start_time: DateTime<Local>,
    videos: Option<GifRecorder>,
    step_key: String,
    last_step: i64,
}

impl MlflowTrackingRecorder {
    /// Create a new instance of `MlflowTrackingRecorder`.
    ///
    /// This method is used in [`MlflowTrackingClient::create_recorder()`].
    ///
    /// This method adds a tag "host_start_time" with the current time.
    /// This tag is useful when using mlflow-export-import: it losts the original time.
    /// See <https://github.com/mlflow/mlflow-export-import/issues/72>
    ///
    /// [`MlflowTrackingClient::create_recorder()`]: crate::MlflowTrackingClient::create_recorder
    pub(crate) fn new(conn: Connection, run: &Run) -> Self {
        let start_time = Local::now();
        let videos = Self::video_dir(run).map(GifRecorder::new);
        let recorder = Self {
            conn,
            run_id: run.info.run_id.clone(),
            run_name: run.info.run_name.clone(),
            storage: RecordStorage::new(),
            start_time,
            videos,
            step_key: "step".to_string(),
            last_step: 0,
        };

        if let Err(e) = recorder.set_tag(
            "host_start_time",
            start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        ) {
            warn!("Failed to set tag host_start_time: {}", e);
        }

        recorder
    }

    fn video_dir(run: &Run) -> Option<PathBuf> {
        let uri = run.info.artifact_uri.as_ref()?;
        let root = std::env::var("MLFLOW_DEFAULT_ARTIFACT_ROOT")
            .ok()
            .map(PathBuf::from);
        match artifact_dir(uri, root.as_deref()) {
            Ok(dir) => Some(dir.join("videos")),
            Err(e) => {
                warn!("Videos will not be saved: {}", e);
                None
            }
        }
    }

    /// The ID of the run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Logs the flattened fields of `params` as parameters of the run.
    pub fn log_params(&self, params: impl Serialize) -> Result<()> {
        for (key, value) in flatten_params(params)?.iter() {
            let params = LogParamParams {
                run_id: &self.run_id,
                key,
                value,
            };
            if let Err(e) = self.conn.post("runs/log-parameter", &params) {
                warn!("Failed to log parameter {}: {}", key, e);
            }
        }
        Ok(())
    }

    /// Sets a tag on the run.
    pub fn set_tag(&self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<()> {
        let params = SetTagParams {
            run_id: &self.run_id,
            key: key.as_ref(),
            value: value.as_ref(),
        };
        self.conn.post("runs/set-tag", &params)?;
        Ok(())
    }

    fn log_metric(&self, key: &str, value: f32, timestamp: i64, step: i64) -> Result<()> {
        let params = LogMetricParams {
            run_id: &self.run_id,
            key,
            value: value as f64,
            timestamp,
            step,
        };
        self.conn.post("runs/log-metric", &params)?;
        Ok(())
    }
}

impl Recorder for MlflowTrackingRecorder {
    fn write(&mut self, record: Record) {
        let timestamp = system_time_as_millis();
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as i64,
            Err(_) => self.last_step,
        };
        self.last_step = step;

        for (key, value) in record.iter() {
            if *key == self.step_key {
                continue;
            }
            match value {
                RecordValue::Scalar(v) => {
                    if let Err(e) = self.log_metric(key, *v, timestamp, step) {
                        warn!("Failed to log metric {}: {}", key, e);
                    }
                }
                RecordValue::Video(video) => match self.videos.as_mut() {
                    Some(videos) => {
                        if let Err(e) = videos.save_video(key, video) {
                            warn!("Failed to save video '{}': {}", key, e);
                        }
                    }
                    None => warn!("No artifact directory for video '{}'", key),
                },
                _ => {} // ignore record value
            }
        }
    }
}

impl AggregateRecorder for MlflowTrackingRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        if !record.is_empty() {
            record.insert(self.step_key.clone(), RecordValue::Scalar(step as _));
            self.write(record);
        }
    }
}

impl Drop for MlflowTrackingRecorder {
    /// Update run's status to "FINISHED" when dropped.
    ///
    /// It also adds tags "host_end_time" and "host_duration" with the current time and duration.
    fn drop(&mut self) {
        let end_time = Local::now();
        let duration = end_time.signed_duration_since(self.start_time);
        let tags = [
            (
                "host_end_time",
                end_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("host_duration", format_duration(&duration)),
        ];
        for (key, value) in tags.iter() {
            if let Err(e) = self.set_tag(key, value) {
                warn!("Failed to set tag {}: {}", key, e);
            }
        }

        let params = UpdateRunParams {
            run_id: &self.run_id,
            status: "FINISHED",
            end_time: end_time.timestamp_millis(),
            run_name: &self.run_name,
        };
        if let Err(e) = self.conn.post("runs/update", &params) {
            warn!("Failed to finish run {}: {}", self.run_id, e);
        }
    }
}

fn format_duration(dt: &Duration) -> String {
    let mut seconds = dt.num_seconds();
    let mut minutes = seconds / 60;
    seconds %= 60;
    let hours = minutes / 60;
    minutes %= 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::seconds(0)), "00:00:00");
        assert_eq!(format_duration(&Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_duration(&Duration::seconds(90000)), "25:00:00");
    }
}
