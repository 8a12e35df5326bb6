//! Observations of racing environments.
use anyhow::Result;
use image::{ImageBuffer, Rgb, RgbImage};
use l2r_core::{error::L2rError, record::RecordValue, Obs};
use ndarray::{concatenate, s, Array2, Array3, ArrayView2, Axis};
use std::collections::HashMap;

/// Name of the front RGB camera.
pub const FRONT_CAMERA: &str = "CameraFrontRGB";

/// Minimum length of the pose vector: position followed by velocity.
pub const POSE_MIN_LEN: usize = 6;

/// A raw RGB camera image, `[H, W, 3]`, channel-last.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame(Array3<u8>);

impl CameraFrame {
    /// Wraps a `[H, W, 3]` array.
    pub fn new(array: Array3<u8>) -> Result<Self, L2rError> {
        let shape = array.shape();
        if shape[2] != 3 {
            return Err(L2rError::ShapeMismatch {
                expected: vec![shape[0], shape[1], 3],
                actual: shape.to_vec(),
            });
        }
        Ok(Self(array))
    }

    /// Builds a frame from row-major RGB bytes.
    pub fn from_raw(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        let array = Array3::from_shape_vec((height, width, 3), data)?;
        Ok(Self(array))
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.0.shape()[0]
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.0.shape()[1]
    }

    /// The underlying `[H, W, 3]` array.
    pub fn as_array(&self) -> &Array3<u8> {
        &self.0
    }

    /// Returns a channel-first copy of the frame and its shape `[3, H, W]`.
    pub fn to_chw(&self) -> (Vec<u8>, [usize; 3]) {
        let chw = self.0.view().permuted_axes([2, 0, 1]);
        let shape = [3, self.height(), self.width()];
        (chw.iter().cloned().collect(), shape)
    }

    /// Converts the frame into an image.
    pub fn to_rgb_image(&self) -> RgbImage {
        let a = &self.0;
        ImageBuffer::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let (x, y) = (x as usize, y as usize);
            Rgb([a[[y, x, 0]], a[[y, x, 1]], a[[y, x, 2]]])
        })
    }
}

/// An observation of a racing simulator.
#[derive(Debug, Clone)]
pub struct RacingObs {
    /// Images keyed by sensor name.
    pub images: HashMap<String, CameraFrame>,

    /// Pose of the vehicle. Elements 0-2 are the position and 3-5 the velocity.
    pub pose: Vec<f32>,
}

impl Obs for RacingObs {}

impl RacingObs {
    /// Creates an observation without images.
    pub fn new(pose: Vec<f32>) -> Self {
        Self {
            images: HashMap::new(),
            pose,
        }
    }

    /// Adds the image of a sensor.
    pub fn with_image(mut self, sensor: impl Into<String>, frame: CameraFrame) -> Self {
        self.images.insert(sensor.into(), frame);
        self
    }

    /// Returns the image of the given sensor.
    pub fn image(&self, sensor: &str) -> Result<&CameraFrame, L2rError> {
        self.images
            .get(sensor)
            .ok_or_else(|| L2rError::MissingSensor(sensor.to_string()))
    }

    /// Returns the velocity, elements 3-5 of the pose.
    pub fn velocity(&self) -> Result<[f32; 3], L2rError> {
        if self.pose.len() < POSE_MIN_LEN {
            return Err(L2rError::PoseTooShort {
                len: self.pose.len(),
                required: POSE_MIN_LEN,
            });
        }
        Ok([self.pose[3], self.pose[4], self.pose[5]])
    }
}

/// Encoded image features followed by the normalized speed, `[1, w + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState(Array2<f32>);

impl Obs for EncodedState {}

impl EncodedState {
    /// Concatenates `[1, w]` features and the speed along columns.
    pub fn new(features: ArrayView2<'_, f32>, speed: f32) -> Result<Self, L2rError> {
        if features.nrows() != 1 {
            return Err(L2rError::ShapeMismatch {
                expected: vec![1, features.ncols()],
                actual: features.shape().to_vec(),
            });
        }
        let speed = Array2::from_elem((1, 1), speed);
        let state = concatenate(Axis(1), &[features.view(), speed.view()]).map_err(|_| {
            L2rError::ShapeMismatch {
                expected: vec![1, features.ncols() + 1],
                actual: features.shape().to_vec(),
            }
        })?;
        Ok(Self(state))
    }

    /// The `[1, w + 1]` array.
    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }

    /// The number of columns, `w + 1`.
    pub fn width(&self) -> usize {
        self.0.ncols()
    }

    /// The encoded image features, `[1, w]`.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.0.slice(s![.., ..self.width() - 1])
    }

    /// The normalized speed in the last column.
    pub fn speed(&self) -> f32 {
        self.0[[0, self.width() - 1]]
    }
}

impl From<EncodedState> for RecordValue {
    fn from(state: EncodedState) -> Self {
        let shape = [state.0.nrows(), state.0.ncols()];
        RecordValue::Array2(state.0.into_iter().collect(), shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_to_chw() -> Result<()> {
        // 1x2 image: red, then blue
        let frame = CameraFrame::from_raw(1, 2, vec![255, 0, 0, 0, 0, 255])?;
        let (chw, shape) = frame.to_chw();

        assert_eq!(shape, [3, 1, 2]);
        assert_eq!(chw, vec![255, 0, 0, 0, 0, 255]);

        let frame = CameraFrame::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(frame.to_chw().0, vec![1, 4, 2, 5, 3, 6]);
        assert_eq!(frame.to_rgb_image().get_pixel(0, 1), &Rgb([4, 5, 6]));
        Ok(())
    }

    #[test]
    fn test_frame_requires_rgb() {
        assert!(CameraFrame::new(Array3::zeros((4, 4, 1))).is_err());
        assert!(CameraFrame::from_raw(2, 2, vec![0; 5]).is_err());
    }

    #[test]
    fn test_missing_sensor_and_short_pose() {
        let obs = RacingObs::new(vec![0.0; 5]);
        assert!(matches!(
            obs.image(FRONT_CAMERA),
            Err(L2rError::MissingSensor(_))
        ));
        assert!(matches!(
            obs.velocity(),
            Err(L2rError::PoseTooShort { len: 5, .. })
        ));
    }

    #[test]
    fn test_encoded_state() -> Result<()> {
        let features = array![[0.5f32, 0.25, 0.0]];
        let state = EncodedState::new(features.view(), 0.3)?;

        assert_eq!(state.width(), 4);
        assert_eq!(state.speed(), 0.3);
        assert_eq!(state.features(), features.view());
        assert!(EncodedState::new(Array2::zeros((2, 3)).view(), 0.0).is_err());

        match RecordValue::from(state) {
            RecordValue::Array2(v, shape) => {
                assert_eq!(shape, [1, 4]);
                assert_eq!(v, vec![0.5, 0.25, 0.0, 0.3]);
            }
            _ => panic!("Expect RecordValue::Array2"),
        }
        Ok(())
    }
}
