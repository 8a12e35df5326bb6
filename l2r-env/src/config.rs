//! Configuration of racing environments.
use crate::FRONT_CAMERA;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Settings of the simulator controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Suppress the output of the simulator.
    pub quiet: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self { quiet: true }
    }
}

/// Settings of episodes and sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvKwargs {
    /// Observe camera images along with the pose.
    pub multimodal: bool,

    /// Run the simulator in evaluation mode.
    pub eval_mode: bool,

    /// Number of laps in evaluation mode.
    pub n_eval_laps: usize,

    /// Maximum number of steps in an episode.
    pub max_timesteps: usize,

    /// Interval between observations in seconds.
    pub obs_delay: f32,

    /// Number of steps without moving before an episode ends.
    pub not_moving_timeout: usize,

    /// Name of the reward policy.
    pub reward_pol: String,

    /// Include waypoints in observations.
    pub provide_waypoints: bool,

    /// Names of the sensors to enable.
    pub active_sensors: Vec<String>,

    /// Apply custom vehicle parameters.
    pub vehicle_params: bool,
}

impl Default for EnvKwargs {
    fn default() -> Self {
        Self {
            multimodal: true,
            eval_mode: true,
            n_eval_laps: 5,
            max_timesteps: 5000,
            obs_delay: 0.1,
            not_moving_timeout: 50000,
            reward_pol: "custom".to_string(),
            provide_waypoints: false,
            active_sensors: vec![FRONT_CAMERA.to_string()],
            vehicle_params: false,
        }
    }
}

/// Settings of the action interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionIfKwargs {
    /// Address of the action interface.
    pub ip: String,

    /// Port of the action interface.
    pub port: u16,

    /// Steering command at action `1.0`, its upper bound.
    pub max_steer: f32,

    /// Lower bound of the steering command.
    pub min_steer: f32,

    /// Acceleration command at action `1.0`, its upper bound.
    pub max_accel: f32,

    /// Lower bound of the acceleration command.
    pub min_accel: f32,
}

impl Default for ActionIfKwargs {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: 7077,
            max_steer: 0.3,
            min_steer: -0.3,
            max_accel: 6.0,
            min_accel: -1.0,
        }
    }
}

/// Settings of the front camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraKwargs {
    /// Width of images in pixels.
    pub image_width: usize,

    /// Height of images in pixels.
    pub image_height: usize,
}

impl Default for CameraKwargs {
    fn default() -> Self {
        Self {
            image_width: 192,
            image_height: 144,
        }
    }
}

/// Configuration of a racing environment.
///
/// Missing fields in YAML take the default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RacingEnvConfig {
    /// Simulator controller.
    pub controller: ControllerConfig,

    /// Episodes and sensors.
    pub env: EnvKwargs,

    /// Action interface.
    pub action_if: ActionIfKwargs,

    /// Front camera.
    pub camera: CameraKwargs,
}

impl RacingEnvConfig {
    /// Sets the maximum number of steps in an episode.
    pub fn max_timesteps(mut self, v: usize) -> Self {
        self.env.max_timesteps = v;
        self
    }

    /// Sets the size of camera images.
    pub fn image_size(mut self, height: usize, width: usize) -> Self {
        self.camera.image_height = height;
        self.camera.image_width = width;
        self
    }

    /// Constructs [`RacingEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RacingEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_defaults() {
        let config = RacingEnvConfig::default();
        assert!(config.controller.quiet);
        assert_eq!(config.env.max_timesteps, 5000);
        assert_eq!(config.env.active_sensors, vec!["CameraFrontRGB"]);
        assert_eq!(config.action_if.port, 7077);
        assert_eq!(config.action_if.min_accel, -1.0);
    }

    #[test]
    fn test_serde_partial_yaml() -> Result<()> {
        let config: RacingEnvConfig =
            serde_yaml::from_str("env:\n  max_timesteps: 20\naction_if:\n  max_accel: 2.0\n")?;
        assert_eq!(config.env.max_timesteps, 20);
        assert_eq!(config.env.n_eval_laps, 5);
        assert_eq!(config.action_if.max_accel, 2.0);
        assert_eq!(config.action_if.ip, "0.0.0.0");

        let dir = TempDir::new("racing_env_config")?;
        let path = dir.path().join("env.yaml");
        config.save(&path)?;
        assert_eq!(RacingEnvConfig::load(&path)?, config);
        Ok(())
    }
}
