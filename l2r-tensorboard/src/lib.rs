//! Tensorboard recorder for l2r.
//!
//! Scalars are written to TFRecord files, 2-dimensional arrays as grayscale
//! images and videos as GIF files under `<logdir>/videos`.
use l2r_core::record::{
    AggregateRecorder, GifRecorder, Record, RecordStorage, RecordValue, Recorder,
};
use log::warn;
use std::path::{Path, PathBuf};
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    videos: GifRecorder,
    storage: RecordStorage,
    step_key: String,
    last_step: usize,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        let videos = GifRecorder::new(logdir.as_ref().join("videos"));
        Self {
            writer: SummaryWriter::new(logdir),
            videos,
            storage: RecordStorage::new(),
            step_key: "step".to_string(),
            last_step: 0,
        }
    }

    /// The directory where videos are saved.
    pub fn video_dir(&self) -> PathBuf {
        self.videos.dir().to_path_buf()
    }

    // Min-max scaling of an array into a grayscale image, replicated over
    // three channels.
    fn to_image(data: &[f32]) -> Vec<u8> {
        let min = data.iter().fold(f32::MAX, |m, v| v.min(m));
        let max = data.iter().fold(-f32::MAX, |m, v| v.max(m));
        let scale = if max > min { max - min } else { 1.0 };
        let gray = data
            .iter()
            .map(|&e| ((e - min) / scale * 255f32) as u8)
            .collect::<Vec<_>>();
        gray.iter().chain(gray.iter()).chain(gray.iter()).cloned().collect()
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// The step is taken from the value under the step key. Records without
    /// it are written at the last seen step.
    fn write(&mut self, record: Record) {
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as usize,
            Err(_) => self.last_step,
        };
        self.last_step = step;

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::Array2(data, shape) => {
                    let image = Self::to_image(data);
                    self.writer
                        .add_image(k, image.as_slice(), &[3, shape[0], shape[1]], step)
                }
                RecordValue::Video(video) => {
                    if let Err(e) = self.videos.save_video(k, video) {
                        warn!("Failed to save video '{}': {}", k, e);
                    }
                }
                _ => {} // discard value
            };
        }
        self.writer.flush();
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let mut record = self.storage.aggregate();
        if !record.is_empty() {
            record.insert(self.step_key.clone(), RecordValue::Scalar(step as _));
            self.write(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2r_core::record::{VideoClip, VideoFormat};
    use tempdir::TempDir;

    #[test]
    fn test_to_image() {
        assert_eq!(TensorboardRecorder::to_image(&[0.0, 1.0]), vec![0, 255, 0, 255, 0, 255]);
        assert_eq!(TensorboardRecorder::to_image(&[2.0, 2.0]), vec![0; 6]);
    }

    #[test]
    fn test_write_scalars_and_videos() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("tensorboard")?;
        let mut recorder = TensorboardRecorder::new(dir.path());

        recorder.store(Record::from_scalar("episode_return", 1.0));
        recorder.store(Record::from_scalar("episode_return", 3.0));
        recorder.flush(1);
        assert_eq!(recorder.last_step, 1);

        let mut clip = VideoClip::new(8, VideoFormat::Gif);
        clip.push_frame(vec![0; 3 * 4 * 4], [3, 4, 4])?;
        let mut record = Record::empty();
        record.insert("Episode Video", RecordValue::Video(clip));
        recorder.write(record);

        let video = recorder.video_dir().join("Episode_Video_0000.gif");
        assert!(video.exists());
        Ok(())
    }
}
