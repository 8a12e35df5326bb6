use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentTag {
    pub key: String,
    pub value: String,
}

/// An experiment on the tracking server.
///
/// Fields from <https://mlflow.org/docs/latest/rest-api.html#mlflowexperiment>.
#[derive(Debug, Clone, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    pub artifact_location: Option<String>,
    pub lifecycle_stage: Option<String>,
    pub tags: Option<Vec<ExperimentTag>>,
}
