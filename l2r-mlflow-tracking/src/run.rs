use serde::Deserialize;

/// A run on the tracking server.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub info: RunInfo,
}

/// Metadata of a run.
///
/// Fields from <https://mlflow.org/docs/latest/rest-api.html#runinfo>.
#[derive(Debug, Clone, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub run_name: String,
    pub experiment_id: String,
    pub status: Option<String>,
    pub artifact_uri: Option<String>,
    pub lifecycle_stage: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_run() -> anyhow::Result<()> {
        let json = r#"{
            "info": {
                "run_id": "7f3a",
                "run_uuid": "7f3a",
                "run_name": "clumsy-ape-42",
                "experiment_id": "1",
                "user_id": "",
                "status": "RUNNING",
                "start_time": 1700000000000,
                "artifact_uri": "mlflow-artifacts:/1/7f3a/artifacts",
                "lifecycle_stage": "active"
            },
            "data": {}
        }"#;
        let run: Run = serde_json::from_str(json)?;
        assert_eq!(run.info.run_name, "clumsy-ape-42");
        assert_eq!(run.info.status.as_deref(), Some("RUNNING"));
        Ok(())
    }
}
