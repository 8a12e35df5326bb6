//! Actions of racing environments and their space.
use fastrand::Rng;
use l2r_core::{error::L2rError, record::RecordValue, Act, ActionSpace};
use serde::{Deserialize, Serialize};

/// A continuous action `[steer, accel]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RacingAct(pub Vec<f32>);

impl Act for RacingAct {}

impl RacingAct {
    /// Creates an action from steering and acceleration.
    pub fn new(steer: f32, accel: f32) -> Self {
        Self(vec![steer, accel])
    }

    /// Steering command, the first element.
    pub fn steer(&self) -> Option<f32> {
        self.0.first().copied()
    }

    /// Acceleration command, the second element.
    pub fn accel(&self) -> Option<f32> {
        self.0.get(1).copied()
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the action has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for RacingAct {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl From<RacingAct> for RecordValue {
    fn from(act: RacingAct) -> Self {
        RecordValue::Array1(act.0)
    }
}

/// Bounds of [`BoxSpace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSpaceConfig {
    /// Lower bounds.
    pub low: Vec<f32>,

    /// Upper bounds.
    pub high: Vec<f32>,
}

impl Default for BoxSpaceConfig {
    fn default() -> Self {
        Self {
            low: vec![-1.0, -1.0],
            high: vec![1.0, 1.0],
        }
    }
}

/// A box of continuous actions, sampled uniformly in `[low, high)` per dimension.
#[derive(Debug, Clone)]
pub struct BoxSpace {
    low: Vec<f32>,
    high: Vec<f32>,
    rng: Rng,
}

impl BoxSpace {
    /// Creates a box with the given bounds.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, L2rError> {
        if low.is_empty() || low.len() != high.len() {
            return Err(L2rError::InvalidActionSpace(format!(
                "bounds have lengths {} and {}",
                low.len(),
                high.len()
            )));
        }
        for (i, (l, h)) in low.iter().zip(high.iter()).enumerate() {
            if !l.is_finite() || !h.is_finite() || l > h {
                return Err(L2rError::InvalidActionSpace(format!(
                    "invalid bounds [{}, {}] in dimension {}",
                    l, h, i
                )));
            }
        }
        Ok(Self {
            low,
            high,
            rng: Rng::new(),
        })
    }

    /// Creates a box from its config, seeding the sampler if `seed` is given.
    pub fn build(config: &BoxSpaceConfig, seed: Option<u64>) -> Result<Self, L2rError> {
        let mut space = Self::new(config.low.clone(), config.high.clone())?;
        if let Some(seed) = seed {
            space.seed(seed);
        }
        Ok(space)
    }

    /// Reseeds the sampler.
    pub fn seed(&mut self, seed: u64) {
        self.rng = Rng::with_seed(seed);
    }

    /// The number of dimensions.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Lower bounds.
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper bounds.
    pub fn high(&self) -> &[f32] {
        &self.high
    }
}

impl ActionSpace<RacingAct> for BoxSpace {
    fn sample(&mut self) -> RacingAct {
        let rng = &self.rng;
        let v = self
            .low
            .iter()
            .zip(self.high.iter())
            .map(|(l, h)| {
                // rounding may land on `h` for tiny ranges
                let x = l + rng.f32() * (h - l);
                if x >= *h && h > l {
                    *l
                } else {
                    x
                }
            })
            .collect();
        RacingAct(v)
    }

    fn contains(&self, act: &RacingAct) -> bool {
        act.len() == self.dim()
            && act
                .0
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(a, (l, h))| l <= a && a <= h)
    }
}
