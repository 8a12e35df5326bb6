//! Encoders of camera frames into feature rows.
use crate::CameraFrame;
use anyhow::Result;
use image::imageops::{self, FilterType};
use l2r_core::error::L2rError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Encodes a camera frame into a `[1, dim]` feature row.
///
/// A trained image encoder plugs into [`EnvContainer`](crate::EnvContainer)
/// by implementing this trait.
pub trait Encoder {
    /// Width of the encoded row.
    fn dim(&self) -> usize;

    /// Encodes a channel-last frame.
    fn encode(&mut self, frame: &CameraFrame) -> Result<Array2<f32>>;
}

impl<T: Encoder + ?Sized> Encoder for Box<T> {
    fn dim(&self) -> usize {
        self.as_ref().dim()
    }

    fn encode(&mut self, frame: &CameraFrame) -> Result<Array2<f32>> {
        self.as_mut().encode(frame)
    }
}

/// Converts the frame to grayscale, resizes it to `size x size` and scales
/// pixels into `[0, 1]`.
#[derive(Debug, Clone)]
pub struct DownsampleEncoder {
    size: u32,
}

impl DownsampleEncoder {
    /// Creates an encoder producing `size * size` features.
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }
}

impl Encoder for DownsampleEncoder {
    fn dim(&self) -> usize {
        (self.size * self.size) as usize
    }

    fn encode(&mut self, frame: &CameraFrame) -> Result<Array2<f32>> {
        let gray = imageops::grayscale(&frame.to_rgb_image());
        let small = imageops::resize(&gray, self.size, self.size, FilterType::Triangle);
        let v: Vec<f32> = small.into_raw().into_iter().map(|p| p as f32 / 255.0).collect();
        Ok(Array2::from_shape_vec((1, self.dim()), v)?)
    }
}

/// Flattens frames of a fixed size and scales pixels into `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FlattenEncoder {
    height: usize,
    width: usize,
}

impl FlattenEncoder {
    /// Creates an encoder for frames of the given size.
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

impl Encoder for FlattenEncoder {
    fn dim(&self) -> usize {
        self.height * self.width * 3
    }

    fn encode(&mut self, frame: &CameraFrame) -> Result<Array2<f32>> {
        if frame.height() != self.height || frame.width() != self.width {
            return Err(L2rError::ShapeMismatch {
                expected: vec![self.height, self.width, 3],
                actual: frame.as_array().shape().to_vec(),
            }
            .into());
        }
        let v: Vec<f32> = frame.as_array().iter().map(|p| *p as f32 / 255.0).collect();
        Ok(Array2::from_shape_vec((1, self.dim()), v)?)
    }
}

/// Selects one of the built-in encoders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderConfig {
    /// [`DownsampleEncoder`].
    Downsample {
        /// Side of the resized image.
        size: u32,
    },

    /// [`FlattenEncoder`].
    Flatten {
        /// Height of frames.
        height: usize,

        /// Width of frames.
        width: usize,
    },
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::Downsample { size: 8 }
    }
}

impl EncoderConfig {
    /// Builds the encoder.
    pub fn build(&self) -> Box<dyn Encoder> {
        match self {
            Self::Downsample { size } => Box::new(DownsampleEncoder::new(*size)),
            Self::Flatten { height, width } => Box::new(FlattenEncoder::new(*height, *width)),
        }
    }
}
