//! A simulator stand-in for tests and smoke runs.
use crate::{CameraFrame, RacingAct, RacingEnvConfig, RacingObs, FRONT_CAMERA};
use anyhow::{bail, Result};
use fastrand::Rng;
use l2r_core::{Env, Info, Step};
use log::trace;

/// Information returned at every step of [`MockRacingEnv`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockInfo {
    /// Steps since the last reset.
    pub t: usize,

    /// Speed of the vehicle.
    pub speed: f32,
}

impl Info for MockInfo {}

/// A deterministic racing simulator.
///
/// Frames are noise drawn from a seeded generator. The vehicle moves on a
/// plane: the acceleration command, scaled into
/// `[min_accel, max_accel]`, changes the speed and the steering command,
/// scaled by `max_steer`, changes the heading. The raw reward is the
/// distance travelled in a step. Episodes end after `max_timesteps` steps.
pub struct MockRacingEnv {
    config: RacingEnvConfig,
    rng: Rng,
    t: usize,
    position: [f32; 3],
    heading: f32,
    speed: f32,
}

impl MockRacingEnv {
    fn frame(&self) -> Result<CameraFrame> {
        let (h, w) = (
            self.config.camera.image_height,
            self.config.camera.image_width,
        );
        let data = (0..h * w * 3).map(|_| self.rng.u8(..)).collect();
        CameraFrame::from_raw(h, w, data)
    }

    fn observe(&self) -> Result<RacingObs> {
        let [x, y, z] = self.position;
        let (vx, vy) = (self.speed * self.heading.cos(), self.speed * self.heading.sin());
        let pose = vec![x, y, z, vx, vy, 0.0];
        Ok(RacingObs::new(pose).with_image(FRONT_CAMERA, self.frame()?))
    }

    /// Steps since the last reset.
    pub fn t(&self) -> usize {
        self.t
    }
}

impl Env for MockRacingEnv {
    type Config = RacingEnvConfig;
    type Obs = RacingObs;
    type Act = RacingAct;
    type Info = MockInfo;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: Rng::with_seed(seed as u64),
            t: 0,
            position: [0.0; 3],
            heading: 0.0,
            speed: 0.0,
        })
    }

    fn reset(&mut self, random_pos: bool) -> Result<RacingObs> {
        self.t = 0;
        self.speed = 0.0;
        self.heading = 0.0;
        self.position = if random_pos {
            [self.rng.f32() * 100.0, self.rng.f32() * 100.0, 0.0]
        } else {
            [0.0; 3]
        };
        self.observe()
    }

    fn step(&mut self, a: &RacingAct) -> Result<Step<Self>> {
        let (steer, accel) = match a.0.as_slice() {
            [steer, accel] => (*steer, *accel),
            _ => bail!("Expected an action of 2 elements, got {}", a.len()),
        };
        let c = &self.config.action_if;
        let dt = self.config.env.obs_delay;

        // commands in [-1, 1] are mapped onto the configured ranges
        let steer = (steer * c.max_steer).max(c.min_steer).min(c.max_steer);
        let accel = (accel * c.max_accel).max(c.min_accel).min(c.max_accel);
        self.heading += steer;
        self.speed = (self.speed + accel * dt).max(0.0);
        self.position[0] += self.speed * self.heading.cos() * dt;
        self.position[1] += self.speed * self.heading.sin() * dt;
        self.t += 1;

        let reward = self.speed * dt;
        let is_done = self.t >= self.config.env.max_timesteps;
        trace!("t = {}, speed = {}, reward = {}", self.t, self.speed, reward);

        let info = MockInfo {
            t: self.t,
            speed: self.speed,
        };
        Ok(Step::new(self.observe()?, a.clone(), reward, is_done, info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RacingEnvConfig {
        RacingEnvConfig::default()
            .max_timesteps(3)
            .image_size(4, 6)
    }

    #[test]
    fn test_observation() -> Result<()> {
        let mut env = MockRacingEnv::build(&config(), 0)?;
        let obs = env.reset(false)?;
        let frame = obs.image(FRONT_CAMERA)?;

        assert_eq!((frame.height(), frame.width()), (4, 6));
        assert_eq!(obs.pose.len(), 6);
        assert_eq!(obs.velocity()?, [0.0; 3]);
        Ok(())
    }

    #[test]
    fn test_seeded_frames() -> Result<()> {
        let mut e1 = MockRacingEnv::build(&config(), 3)?;
        let mut e2 = MockRacingEnv::build(&config(), 3)?;
        assert_eq!(
            e1.reset(false)?.image(FRONT_CAMERA)?,
            e2.reset(false)?.image(FRONT_CAMERA)?
        );
        Ok(())
    }

    #[test]
    fn test_accelerate_until_done() -> Result<()> {
        let mut env = MockRacingEnv::build(&config(), 0)?;
        env.reset(false)?;

        let step = env.step(&RacingAct::new(0.0, 1.0))?;
        assert!(!step.is_done());
        assert!(step.info.speed > 0.0);
        assert!(step.reward > 0.0);
        assert!(step.obs.velocity()?[0] > 0.0);

        env.step(&RacingAct::new(0.0, 1.0))?;
        let step = env.step(&RacingAct::new(0.0, -1.0))?;
        assert!(step.is_done());
        assert_eq!(step.info.t, 3);
        Ok(())
    }

    #[test]
    fn test_malformed_action() -> Result<()> {
        let mut env = MockRacingEnv::build(&config(), 0)?;
        env.reset(false)?;
        assert!(env.step(&RacingAct(vec![0.0])).is_err());
        Ok(())
    }
}
