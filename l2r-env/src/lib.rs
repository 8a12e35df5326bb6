//! Racing environments for agents.
//!
//! [`EnvContainer`] adapts a racing simulator, anything implementing
//! [`Env`](l2r_core::Env) with [`RacingObs`] observations, to agents.
//! Observations are encoded into [`EncodedState`] rows: the front camera
//! image goes through an [`Encoder`] and the speed of the vehicle is
//! appended. Camera frames of each episode are written to a recorder as a
//! video when the next episode starts.
//!
//! ```no_run
//! # use anyhow::Result;
//! use l2r_core::{record::NullRecorder, Env};
//! use l2r_env::{DownsampleEncoder, EnvContainer, MockRacingEnv, RacingEnvConfig};
//!
//! # fn main() -> Result<()> {
//! let env = MockRacingEnv::build(&RacingEnvConfig::default(), 42)?;
//! let mut container: EnvContainer<MockRacingEnv, _, _> =
//!     EnvContainer::new(DownsampleEncoder::new(8), NullRecorder {}).with_env(env);
//! let state = container.reset(false, None)?;
//! assert_eq!(state.width(), 65);
//! # Ok(())
//! # }
//! ```
mod act;
mod config;
mod container;
mod encoder;
mod mock;
mod obs;
pub use act::{BoxSpace, BoxSpaceConfig, RacingAct};
pub use config::{ActionIfKwargs, CameraKwargs, ControllerConfig, EnvKwargs, RacingEnvConfig};
pub use container::{
    normalized_speed, rescale_reward, EnvContainer, REWARD_SCALE, SPEED_SCALE, VIDEO_FPS,
    VIDEO_LOG_KEY,
};
pub use encoder::{DownsampleEncoder, Encoder, EncoderConfig, FlattenEncoder};
pub use mock::{MockInfo, MockRacingEnv};
pub use obs::{CameraFrame, EncodedState, RacingObs, FRONT_CAMERA, POSE_MIN_LEN};
