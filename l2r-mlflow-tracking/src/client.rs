use crate::{system_time_as_millis, Experiment, MlflowTrackingRecorder, Run};
use anyhow::{anyhow, Context, Result};
use log::info;
use reqwest::blocking::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct ExperimentResponse {
    experiment: Experiment,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    run: Run,
}

/// Parameters from <https://mlflow.org/docs/latest/rest-api.html#create-run>.
#[derive(Debug, Serialize)]
struct CreateRunParams {
    experiment_id: String,
    start_time: i64,
    run_name: String,
}

#[derive(Debug, Serialize)]
struct CreateExperimentParams {
    name: String,
}

/// Connection settings shared by the client and its recorders.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    client: Client,
    base_url: String,
    user_name: String,
    password: String,
}

impl Connection {
    fn url(&self, api: &str) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, api)
    }

    fn check(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().unwrap_or_default();
            Err(anyhow!("Tracking server returned {}: {}", status, body))
        }
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, api: &str, query: &impl Serialize) -> Result<T> {
        let resp = self
            .client
            .get(self.url(api))
            .basic_auth(&self.user_name, Some(&self.password))
            .query(query)
            .send()?;
        Ok(Self::check(resp)?.json()?)
    }

    pub(crate) fn post(&self, api: &str, params: &impl Serialize) -> Result<Response> {
        let resp = self
            .client
            .post(self.url(api))
            .basic_auth(&self.user_name, Some(&self.password))
            .json(params) // auto serialize
            .send()?;
        Self::check(resp)
    }
}

/// Provides access to a MLflow tracking server via REST API.
///
/// Support Mlflow API version 2.0.
pub struct MlflowTrackingClient {
    conn: Connection,

    /// Current experiment ID.
    experiment_id: Option<String>,
}

impl MlflowTrackingClient {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            conn: Connection {
                client: Client::new(),
                base_url: base_url.as_ref().trim_end_matches('/').to_string(),
                user_name: "".to_string(),
                password: "".to_string(),
            },
            experiment_id: None,
        }
    }

    /// Set user name and password for basic authentication of the tracking server.
    pub fn basic_auth(mut self, user_name: impl AsRef<str>, password: impl AsRef<str>) -> Self {
        self.conn.user_name = user_name.as_ref().to_string();
        self.conn.password = password.as_ref().to_string();
        self
    }

    /// Sets the experiment of runs created afterwards.
    ///
    /// The experiment is created if it does not exist on the tracking server.
    pub fn set_experiment(mut self, name: impl AsRef<str>) -> Result<Self> {
        let experiment = self.get_experiment(name.as_ref())?;
        info!(
            "For experiment '{}', id={} is set in MlflowTrackingClient",
            name.as_ref(),
            experiment.experiment_id
        );
        self.experiment_id = Some(experiment.experiment_id);
        Ok(self)
    }

    /// The ID of the current experiment.
    pub fn experiment_id(&self) -> Option<&str> {
        self.experiment_id.as_deref()
    }

    /// Get [`Experiment`] by name from the tracking server.
    ///
    /// If the experiment with given name does not exist in the tracking server,
    /// it will be created.
    pub fn get_experiment(&self, name: impl AsRef<str>) -> Result<Experiment> {
        let query = [("experiment_name", name.as_ref())];
        let resp: Result<ExperimentResponse> = self.conn.get("experiments/get-by-name", &query);
        match resp {
            Ok(resp) => Ok(resp.experiment),
            Err(_) => {
                info!("Create experiment '{}'", name.as_ref());
                self.conn.post(
                    "experiments/create",
                    &CreateExperimentParams {
                        name: name.as_ref().into(),
                    },
                )?;
                let resp: ExperimentResponse = self
                    .conn
                    .get("experiments/get-by-name", &query)
                    .with_context(|| format!("Failed to get experiment {:?}", name.as_ref()))?;
                Ok(resp.experiment)
            }
        }
    }

    /// Create [`MlflowTrackingRecorder`] corresponding to a run.
    ///
    /// If `run_name` is empty (`""`), a run name is generated by the tracking server.
    ///
    /// Need to call [`MlflowTrackingClient::set_experiment()`] before calling this method.
    pub fn create_recorder(&self, run_name: impl AsRef<str>) -> Result<MlflowTrackingRecorder> {
        let experiment_id = self
            .experiment_id
            .as_ref()
            .ok_or_else(|| anyhow!("No experiment is set in MlflowTrackingClient"))?;
        let resp = self.conn.post(
            "runs/create",
            &CreateRunParams {
                experiment_id: experiment_id.to_string(),
                start_time: system_time_as_millis(),
                run_name: run_name.as_ref().to_string(),
            },
        )?;
        let run = resp
            .json::<RunResponse>()
            .context("Failed to deserialize Run")?
            .run;
        if run_name.as_ref().is_empty() {
            info!(
                "Run name '{}' has been automatically generated",
                run.info.run_name
            );
        }
        Ok(MlflowTrackingRecorder::new(self.conn.clone(), &run))
    }
}
