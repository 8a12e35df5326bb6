//! Video clips built from channel-first frames.
use crate::error::L2rError;
use anyhow::{bail, Result};
use image::{codecs::gif::GifEncoder, Delay, Frame, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Encoding of a [`VideoClip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoFormat {
    /// Animated GIF.
    Gif,
}

impl VideoFormat {
    /// File extension of the format.
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Gif => "gif",
        }
    }
}

/// An ordered sequence of frames with a frame rate.
///
/// Frames are stored channel-first, `[C, H, W]`, with one (grayscale) or
/// three (RGB) channels. All frames of a clip share the same shape.
#[derive(Debug, Clone)]
pub struct VideoClip {
    frames: Vec<Vec<u8>>,
    shape: Option<[usize; 3]>,
    fps: u32,
    format: VideoFormat,
}

impl VideoClip {
    /// Creates an empty clip.
    pub fn new(fps: u32, format: VideoFormat) -> Self {
        Self {
            frames: vec![],
            shape: None,
            fps,
            format,
        }
    }

    /// Appends a channel-first frame of the given shape.
    ///
    /// Fails if the data does not match the shape, or if the shape differs
    /// from the one of the frames already in the clip.
    pub fn push_frame(&mut self, data: Vec<u8>, shape: [usize; 3]) -> Result<(), L2rError> {
        let [c, h, w] = shape;
        if c != 1 && c != 3 {
            return Err(L2rError::ShapeMismatch {
                expected: vec![3, h, w],
                actual: shape.to_vec(),
            });
        }
        if data.len() != c * h * w {
            return Err(L2rError::ShapeMismatch {
                expected: vec![c * h * w],
                actual: vec![data.len()],
            });
        }
        if let Some(s) = self.shape {
            if s != shape {
                return Err(L2rError::ShapeMismatch {
                    expected: s.to_vec(),
                    actual: shape.to_vec(),
                });
            }
        }
        self.shape = Some(shape);
        self.frames.push(data);
        Ok(())
    }

    /// The number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if the clip has no frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Encoding of the clip.
    pub fn format(&self) -> VideoFormat {
        self.format
    }

    /// Shape `[C, H, W]` of the frames, `None` for an empty clip.
    pub fn shape(&self) -> Option<[usize; 3]> {
        self.shape
    }

    /// The frames in the order they were pushed.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Moves the frames out into a new clip, leaving this one empty.
    ///
    /// Returns `None` if there is no frame.
    pub fn take(&mut self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }
        let empty = Self::new(self.fps, self.format);
        Some(std::mem::replace(self, empty))
    }

    fn to_rgba(data: &[u8], shape: [usize; 3]) -> RgbaImage {
        let [c, h, w] = shape;
        let plane = h * w;
        RgbaImage::from_fn(w as u32, h as u32, |x, y| {
            let ix = y as usize * w + x as usize;
            if c == 3 {
                Rgba([data[ix], data[plane + ix], data[2 * plane + ix], 255])
            } else {
                let v = data[ix];
                Rgba([v, v, v, 255])
            }
        })
    }

    /// Encodes the clip into the given writer.
    pub fn write<W: Write>(&self, w: W) -> Result<()> {
        let shape = match self.shape {
            Some(shape) => shape,
            None => bail!("Cannot encode an empty video clip"),
        };

        match self.format {
            VideoFormat::Gif => {
                let delay = Delay::from_numer_denom_ms(1000, self.fps.max(1));
                let frames = self
                    .frames
                    .iter()
                    .map(|data| Frame::from_parts(Self::to_rgba(data, shape), 0, 0, delay));
                let mut encoder = GifEncoder::new(w);
                encoder.encode_frames(frames)?;
            }
        }

        Ok(())
    }

    /// Encodes the clip into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(v: u8) -> Vec<u8> {
        vec![v; 3 * 4 * 5]
    }

    #[test]
    fn test_push_frame_checks_shape() {
        let mut clip = VideoClip::new(8, VideoFormat::Gif);
        clip.push_frame(frame(0), [3, 4, 5]).unwrap();
        clip.push_frame(frame(1), [3, 4, 5]).unwrap();

        assert!(clip.push_frame(frame(2), [3, 5, 4]).is_err());
        assert!(clip.push_frame(vec![0; 7], [3, 4, 5]).is_err());
        assert!(clip.push_frame(vec![0; 2 * 4 * 5], [2, 4, 5]).is_err());
        assert_eq!(clip.len(), 2);
        assert_eq!(clip.shape(), Some([3, 4, 5]));
    }

    #[test]
    fn test_take_leaves_empty_clip() {
        let mut clip = VideoClip::new(8, VideoFormat::Gif);
        assert!(clip.take().is_none());

        clip.push_frame(frame(0), [3, 4, 5]).unwrap();
        let taken = clip.take().unwrap();

        assert_eq!(taken.len(), 1);
        assert_eq!(taken.fps(), 8);
        assert!(clip.is_empty());
        assert_eq!(clip.shape(), None);
        assert_eq!(clip.fps(), 8);
    }

    #[test]
    fn test_write_gif() {
        let mut clip = VideoClip::new(8, VideoFormat::Gif);
        for v in 0..3 {
            clip.push_frame(frame(v * 80), [3, 4, 5]).unwrap();
        }
        let mut buf = vec![];
        clip.write(&mut buf).unwrap();

        assert_eq!(&buf[..3], b"GIF");
        assert!(VideoClip::new(8, VideoFormat::Gif).write(vec![]).is_err());
    }
}
