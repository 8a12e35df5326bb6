//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum L2rError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The observation does not contain the image of the given sensor.
    #[error("Sensor '{0}' was not found in the observation")]
    MissingSensor(String),

    /// The pose vector is shorter than required.
    #[error("Pose vector has {len} elements, at least {required} are required")]
    PoseTooShort {
        /// Length of the given pose vector.
        len: usize,

        /// Minimum length.
        required: usize,
    },

    /// Shapes of arrays do not agree.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,

        /// Actual shape.
        actual: Vec<usize>,
    },

    /// No environment has been given to the container.
    #[error("No environment is held by the container")]
    NoEnvironment,

    /// No agent is registered with the given name.
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The configuration of an agent could not be validated.
    #[error("Invalid configuration for agent '{name}': {reason}")]
    InvalidAgentConfig {
        /// Name of the agent.
        name: String,

        /// What went wrong.
        reason: String,
    },

    /// Bounds of an action space are malformed.
    #[error("Invalid action space: {0}")]
    InvalidActionSpace(String),
}
