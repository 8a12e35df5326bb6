//! Adapter between a racing simulator and agents.
use crate::{CameraFrame, EncodedState, Encoder, RacingObs, FRONT_CAMERA};
use anyhow::Result;
use l2r_core::{
    error::L2rError,
    record::{Record, RecordValue, Recorder, VideoClip, VideoFormat},
    ActionSample, Env, EpisodicEnv,
};
use log::{debug, trace, warn};

/// Key under which episode videos are written.
pub const VIDEO_LOG_KEY: &str = "Episode Video";

/// Frame rate of episode videos.
pub const VIDEO_FPS: u32 = 8;

/// Raw rewards are divided by this value.
pub const REWARD_SCALE: f32 = 150.0;

/// Speeds are divided by this value.
pub const SPEED_SCALE: f32 = 100.0;

/// Rescales a raw reward to `min(raw / 150, 1)`.
///
/// There is no lower bound and NaN passes through.
pub fn rescale_reward(raw: f32) -> f32 {
    let r = raw / REWARD_SCALE;
    if r > 1.0 {
        1.0
    } else {
        r
    }
}

/// The L2 norm of the velocity in `pose[3..6]`, divided by 100.
pub fn normalized_speed(pose: &[f32]) -> Result<f32, L2rError> {
    if pose.len() < crate::obs::POSE_MIN_LEN {
        return Err(L2rError::PoseTooShort {
            len: pose.len(),
            required: crate::obs::POSE_MIN_LEN,
        });
    }
    let norm = pose[3..6].iter().map(|v| v * v).sum::<f32>().sqrt();
    Ok(norm / SPEED_SCALE)
}

/// Wraps a racing simulator, encoding its observations for agents.
///
/// The container turns the front camera image and the pose of the vehicle
/// into an [`EncodedState`], rescales rewards, and keeps the camera frames
/// of the running episode. When the next episode starts, the frames are
/// written to the recorder as a GIF clip under [`VIDEO_LOG_KEY`].
///
/// The simulator is optional at construction and can be replaced on every
/// `reset` or `step`. Writing videos with an
/// [`AsyncRecorder`](l2r_core::record::AsyncRecorder) keeps encoding off
/// the control loop.
pub struct EnvContainer<E, C = Box<dyn Encoder>, R = Box<dyn Recorder>> {
    encoder: C,
    env: Option<E>,
    recorder: R,
    video: VideoClip,
}

impl<E, C, R> EnvContainer<E, C, R>
where
    E: Env<Obs = RacingObs>,
    C: Encoder,
    R: Recorder,
{
    /// Creates a container without a simulator.
    pub fn new(encoder: C, recorder: R) -> Self {
        Self {
            encoder,
            env: None,
            recorder,
            video: VideoClip::new(VIDEO_FPS, VideoFormat::Gif),
        }
    }

    /// Sets the simulator.
    pub fn with_env(mut self, env: E) -> Self {
        self.env = Some(env);
        self
    }

    /// Starts an episode.
    ///
    /// The frames of the previous episode, if any, are written to the
    /// recorder first. `env` replaces the held simulator when given.
    pub fn reset(&mut self, random_pos: bool, env: Option<E>) -> Result<EncodedState> {
        self.flush_video();
        if let Some(env) = env {
            self.env = Some(env);
        }
        let obs = self
            .env
            .as_mut()
            .ok_or(L2rError::NoEnvironment)?
            .reset(random_pos)?;
        self.process_obs(&obs)
    }

    /// Applies an action and returns `(state, reward, done, info)`.
    ///
    /// The reward is rescaled with [`rescale_reward`].
    pub fn step(
        &mut self,
        action: &ActionSample<E::Act>,
        env: Option<E>,
    ) -> Result<(EncodedState, f32, bool, E::Info)> {
        if let Some(env) = env {
            self.env = Some(env);
        }
        let step = self
            .env
            .as_mut()
            .ok_or(L2rError::NoEnvironment)?
            .step(&action.action)?;
        let reward = rescale_reward(step.reward);
        trace!("raw reward = {}, reward = {}", step.reward, reward);
        let state = self.process_obs(&step.obs)?;
        Ok((state, reward, step.is_done, step.info))
    }

    /// Encodes the observation and buffers its front camera frame.
    ///
    /// The frame is buffered only when encoding succeeds, so an error leaves
    /// the buffer untouched. Buffering itself never fails the call.
    pub fn process_obs(&mut self, obs: &RacingObs) -> Result<EncodedState> {
        let frame = obs.image(FRONT_CAMERA)?;
        let speed = normalized_speed(&obs.pose)?;

        let features = self.encoder.encode(frame)?;
        let dim = self.encoder.dim();
        if features.shape() != [1, dim] {
            return Err(L2rError::ShapeMismatch {
                expected: vec![1, dim],
                actual: features.shape().to_vec(),
            }
            .into());
        }
        let state = EncodedState::new(features.view(), speed)?;

        self.buffer_frame(frame);
        Ok(state)
    }

    // A frame of another resolution closes the running clip and starts a
    // new one.
    fn buffer_frame(&mut self, frame: &CameraFrame) {
        let (chw, shape) = frame.to_chw();
        if let Some(prev) = self.video.shape() {
            if prev != shape {
                warn!(
                    "Camera frame shape changed from {:?} to {:?}, starting a new clip",
                    prev, shape
                );
                self.flush_video();
            }
        }
        if let Err(e) = self.video.push_frame(chw, shape) {
            warn!("Failed to buffer a camera frame: {}", e);
        }
    }

    /// Takes the frames of the running episode, leaving the buffer empty.
    ///
    /// Returns `None` if no frame has been buffered.
    pub fn take_episode_video(&mut self) -> Option<VideoClip> {
        self.video.take()
    }

    /// Writes the buffered frames to the recorder and returns `true` if
    /// there were any.
    pub fn flush_video(&mut self) -> bool {
        match self.take_episode_video() {
            Some(clip) => {
                debug!("Write a video of {} frames", clip.len());
                let mut record = Record::empty();
                record.insert(VIDEO_LOG_KEY, RecordValue::Video(clip));
                self.recorder.write(record);
                true
            }
            None => false,
        }
    }

    /// The held simulator.
    pub fn env(&self) -> Option<&E> {
        self.env.as_ref()
    }

    /// The held simulator.
    pub fn env_mut(&mut self) -> Option<&mut E> {
        self.env.as_mut()
    }

    /// Replaces the held simulator, returning the previous one.
    pub fn replace_env(&mut self, env: E) -> Option<E> {
        self.env.replace(env)
    }

    /// The recorder receiving episode videos.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// The number of frames buffered in the running episode.
    pub fn n_buffered_frames(&self) -> usize {
        self.video.len()
    }

    /// Width of encoded states, the encoder width plus one.
    pub fn encoded_dim(&self) -> usize {
        self.encoder.dim() + 1
    }
}

impl<E, C, R> EpisodicEnv for EnvContainer<E, C, R>
where
    E: Env<Obs = RacingObs>,
    C: Encoder,
    R: Recorder,
{
    type Obs = EncodedState;
    type Act = E::Act;
    type Info = E::Info;

    fn reset_episode(&mut self, random_pos: bool) -> Result<EncodedState> {
        self.reset(random_pos, None)
    }

    fn step_episode(
        &mut self,
        act: &ActionSample<E::Act>,
    ) -> Result<(EncodedState, f32, bool, E::Info)> {
        self.step(act, None)
    }

    fn finish(&mut self) {
        self.flush_video();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DownsampleEncoder, FlattenEncoder, RacingAct};
    use l2r_core::record::GifRecorder;
    use tempdir::TempDir;
    use anyhow::bail;
    use l2r_core::{record::BufferedRecorder, Step};
    use ndarray::Array2;
    use std::collections::VecDeque;

    /// Replays scripted observations and raw rewards.
    struct ScriptedEnv {
        obs: VecDeque<RacingObs>,
        rewards: VecDeque<f32>,
        n_resets: usize,
        last_random_pos: Option<bool>,
    }

    impl Env for ScriptedEnv {
        type Config = ();
        type Obs = RacingObs;
        type Act = RacingAct;
        type Info = ();

        fn build(_config: &(), _seed: i64) -> Result<Self> {
            Ok(scripted(vec![], vec![]))
        }

        fn reset(&mut self, random_pos: bool) -> Result<RacingObs> {
            self.n_resets += 1;
            self.last_random_pos = Some(random_pos);
            match self.obs.pop_front() {
                Some(obs) => Ok(obs),
                None => bail!("no more observations"),
            }
        }

        fn step(&mut self, a: &RacingAct) -> Result<Step<Self>> {
            let obs = match self.obs.pop_front() {
                Some(obs) => obs,
                None => bail!("no more observations"),
            };
            let reward = self.rewards.pop_front().unwrap_or(0.0);
            Ok(Step::new(obs, a.clone(), reward, self.obs.is_empty(), ()))
        }
    }

    fn scripted(obs: Vec<RacingObs>, rewards: Vec<f32>) -> ScriptedEnv {
        ScriptedEnv {
            obs: obs.into(),
            rewards: rewards.into(),
            n_resets: 0,
            last_random_pos: None,
        }
    }

    fn obs(velocity: [f32; 3]) -> RacingObs {
        let frame = CameraFrame::from_raw(2, 2, vec![128; 12]).unwrap();
        let pose = vec![1.0, 2.0, 3.0, velocity[0], velocity[1], velocity[2], 9.0];
        RacingObs::new(pose).with_image(FRONT_CAMERA, frame)
    }

    fn container(
        env: Option<ScriptedEnv>,
    ) -> EnvContainer<ScriptedEnv, FlattenEncoder, BufferedRecorder> {
        let container = EnvContainer::new(FlattenEncoder::new(2, 2), BufferedRecorder::new());
        match env {
            Some(env) => container.with_env(env),
            None => container,
        }
    }

    fn act() -> ActionSample<RacingAct> {
        RacingAct::new(0.0, 1.0).into()
    }

    #[test]
    fn test_rescale_reward() {
        assert_eq!(rescale_reward(75.0), 0.5);
        assert_eq!(rescale_reward(150.0), 1.0);
        assert_eq!(rescale_reward(1000.0), 1.0);
        assert_eq!(rescale_reward(-300.0), -2.0);
        assert!(rescale_reward(f32::NAN).is_nan());
    }

    #[test]
    fn test_normalized_speed() -> Result<()> {
        assert!((normalized_speed(&[0.0, 0.0, 0.0, 3.0, -4.0, 0.0])? - 0.05).abs() < 1e-6);
        assert_eq!(normalized_speed(&[9.0, 9.0, 9.0, 0.0, 0.0, 0.0, 9.0])?, 0.0);
        assert!(normalized_speed(&[-1.0, -2.0, -3.0, -1.0, -2.0, -2.0])? > 0.0);
        assert!(matches!(
            normalized_speed(&[0.0; 5]),
            Err(L2rError::PoseTooShort { len: 5, required: 6 })
        ));
        Ok(())
    }

    #[test]
    fn test_encoded_width_is_constant() -> Result<()> {
        let env = scripted(vec![obs([0.0; 3]), obs([3.0, 4.0, 0.0]), obs([0.0; 3])], vec![]);
        let mut container = container(Some(env));

        let s0 = container.reset(false, None)?;
        let (s1, ..) = container.step(&act(), None)?;

        assert_eq!(container.encoded_dim(), 13);
        assert_eq!(s0.width(), 13);
        assert_eq!(s1.width(), 13);
        assert!((s1.speed() - 0.05).abs() < 1e-6);
        assert!((s1.features()[[0, 0]] - 128.0 / 255.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_step_rescales_reward() -> Result<()> {
        let env = scripted(vec![obs([0.0; 3]), obs([0.0; 3]), obs([0.0; 3])], vec![300.0, -15.0]);
        let mut container = container(Some(env));
        container.reset(true, None)?;
        assert_eq!(container.env().unwrap().last_random_pos, Some(true));

        let (_, r1, done1, _) = container.step(&act(), None)?;
        let (_, r2, done2, _) = container.step(&act(), None)?;

        assert_eq!(r1, 1.0);
        assert!(!done1);
        assert!((r2 + 0.1).abs() < 1e-6);
        assert!(done2);
        Ok(())
    }

    #[test]
    fn test_reset_flushes_video() -> Result<()> {
        let env = scripted((0..5).map(|_| obs([0.0; 3])).collect(), vec![]);
        let mut container = container(Some(env));

        // Empty buffer, no video
        container.reset(false, None)?;
        assert_eq!(container.recorder().len(), 0);
        assert_eq!(container.n_buffered_frames(), 1);

        container.step(&act(), None)?;
        container.step(&act(), None)?;
        assert_eq!(container.n_buffered_frames(), 3);

        container.reset(false, None)?;
        assert_eq!(container.recorder().len(), 1);
        let record = container.recorder().iter().next().unwrap();
        let clip = record.get_video(VIDEO_LOG_KEY)?;
        assert_eq!(clip.len(), 3);
        assert_eq!(clip.fps(), VIDEO_FPS);
        assert_eq!(clip.shape(), Some([3, 2, 2]));

        // Only the first frame of the new episode is buffered
        assert_eq!(container.n_buffered_frames(), 1);
        Ok(())
    }

    #[test]
    fn test_take_episode_video() -> Result<()> {
        let env = scripted(vec![obs([0.0; 3]), obs([0.0; 3])], vec![]);
        let mut container = container(Some(env));
        assert!(container.take_episode_video().is_none());

        container.reset(false, None)?;
        let clip = container.take_episode_video().unwrap();
        assert_eq!(clip.len(), 1);
        assert_eq!(container.n_buffered_frames(), 0);

        // Nothing left to write
        container.reset(false, None)?;
        assert_eq!(container.recorder().len(), 0);
        Ok(())
    }

    #[test]
    fn test_malformed_observation_keeps_buffer() -> Result<()> {
        let mut container = container(None);

        let no_camera = RacingObs::new(vec![0.0; 6]);
        assert!(matches!(
            container.process_obs(&no_camera).unwrap_err().downcast_ref::<L2rError>(),
            Some(L2rError::MissingSensor(_))
        ));

        let mut short_pose = obs([0.0; 3]);
        short_pose.pose.truncate(4);
        assert!(matches!(
            container.process_obs(&short_pose).unwrap_err().downcast_ref::<L2rError>(),
            Some(L2rError::PoseTooShort { .. })
        ));
        assert_eq!(container.n_buffered_frames(), 0);
        Ok(())
    }

    #[test]
    fn test_no_environment() {
        let mut container = container(None);
        let err = container.reset(false, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<L2rError>(),
            Some(L2rError::NoEnvironment)
        ));
        assert!(container.step(&act(), None).is_err());
    }

    #[test]
    fn test_replace_env() -> Result<()> {
        let mut container = container(None);
        let state = container.reset(false, Some(scripted(vec![obs([0.0; 3])], vec![])))?;
        assert_eq!(state.width(), 13);
        assert_eq!(container.env().unwrap().n_resets, 1);

        let prev = container.replace_env(scripted(vec![], vec![]));
        assert!(prev.is_some());
        assert_eq!(container.env().unwrap().n_resets, 0);

        // Observations pushed into the held simulator are used by the next step
        if let Some(env) = container.env_mut() {
            env.obs.push_back(obs([0.0, 0.0, 100.0]));
        }
        let (state, ..) = container.step(&act(), None)?;
        assert_eq!(state.speed(), 1.0);
        Ok(())
    }

    #[test]
    fn test_encoder_row_mismatch() {
        struct TwoRows;

        impl Encoder for TwoRows {
            fn dim(&self) -> usize {
                4
            }

            fn encode(&mut self, _frame: &CameraFrame) -> Result<Array2<f32>> {
                Ok(Array2::zeros((2, 4)))
            }
        }

        let mut container: EnvContainer<ScriptedEnv, _, _> =
            EnvContainer::new(TwoRows, BufferedRecorder::new());
        let err = container.process_obs(&obs([0.0; 3])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<L2rError>(),
            Some(L2rError::ShapeMismatch { .. })
        ));
        assert_eq!(container.n_buffered_frames(), 0);
    }

    #[test]
    fn test_encoder_error_keeps_buffer() -> Result<()> {
        let mut container = container(None);
        container.process_obs(&obs([0.0; 3]))?;

        // FlattenEncoder(2, 2) rejects a 3x3 frame
        let frame = CameraFrame::from_raw(3, 3, vec![0; 27])?;
        let large = RacingObs::new(vec![0.0; 6]).with_image(FRONT_CAMERA, frame);
        assert!(container.process_obs(&large).is_err());
        assert_eq!(container.n_buffered_frames(), 1);
        Ok(())
    }

    #[test]
    fn test_frame_shape_change_starts_new_clip() -> Result<()> {
        let frame = CameraFrame::from_raw(3, 3, vec![64; 27])?;
        let large = RacingObs::new(vec![0.0; 6]).with_image(FRONT_CAMERA, frame);
        let env = scripted(vec![obs([0.0; 3]), obs([0.0; 3]), large], vec![]);
        let mut container: EnvContainer<ScriptedEnv, _, _> =
            EnvContainer::new(DownsampleEncoder::new(2), BufferedRecorder::new()).with_env(env);

        container.reset(false, None)?;
        container.step(&act(), None)?;
        let (state, ..) = container.step(&act(), None)?;
        assert_eq!(state.width(), 5);

        // The 2x2 frames were written, the 3x3 one opens a new clip
        assert_eq!(container.recorder().len(), 1);
        let record = container.recorder().iter().next().unwrap();
        assert_eq!(record.get_video(VIDEO_LOG_KEY)?.shape(), Some([3, 2, 2]));
        assert_eq!(record.get_video(VIDEO_LOG_KEY)?.len(), 2);
        assert_eq!(container.n_buffered_frames(), 1);
        assert_eq!(
            container.take_episode_video().and_then(|clip| clip.shape()),
            Some([3, 3, 3])
        );
        Ok(())
    }

    #[test]
    fn test_reset_ignores_video_write_failure() -> Result<()> {
        let dir = TempDir::new("container")?;
        let not_a_dir = dir.path().join("videos");
        std::fs::write(&not_a_dir, b"")?;

        let env = scripted((0..3).map(|_| obs([0.0; 3])).collect(), vec![]);
        let mut container: EnvContainer<ScriptedEnv, _, _> =
            EnvContainer::new(FlattenEncoder::new(2, 2), GifRecorder::new(&not_a_dir))
                .with_env(env);

        container.reset(false, None)?;
        container.step(&act(), None)?;
        assert_eq!(container.n_buffered_frames(), 2);

        let state = container.reset(false, None)?;
        assert_eq!(state.width(), 13);
        assert_eq!(container.n_buffered_frames(), 1);
        assert_eq!(container.recorder().count(), 0);
        assert!(not_a_dir.is_file());
        Ok(())
    }

    #[test]
    fn test_finish_flushes_video() -> Result<()> {
        let env = scripted(vec![obs([0.0; 3])], vec![]);
        let mut container = container(Some(env));
        container.reset_episode(false)?;
        container.finish();
        assert_eq!(container.recorder().len(), 1);
        assert_eq!(container.n_buffered_frames(), 0);
        Ok(())
    }
}
