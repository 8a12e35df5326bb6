use super::{Record, RecordValue, Recorder, VideoClip};
use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Saves videos in records as files, ignoring other values.
///
/// The `n`-th video written under key `k` is saved to `<dir>/<k>_<n>.gif`,
/// where characters other than alphanumerics, `-` and `_` in the key are
/// replaced with `_`.
pub struct GifRecorder {
    dir: PathBuf,
    count: usize,
}

impl GifRecorder {
    /// Constructs the recorder. `dir` is created on the first video if missing.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            count: 0,
        }
    }

    /// The directory where videos are saved.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The number of videos saved so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the file name of a video.
    pub fn file_name(key: &str, n: usize, extension: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| match c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                true => c,
                false => '_',
            })
            .collect();
        format!("{}_{:04}.{}", key, n, extension)
    }

    /// Saves a video and returns the path of the file.
    pub fn save_video(&mut self, key: &str, video: &VideoClip) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self
            .dir
            .join(Self::file_name(key, self.count, video.format().extension()));
        video.save(&path)?;
        self.count += 1;
        info!("Saved {} frames to {:?}", video.len(), &path);
        Ok(path)
    }
}

impl Recorder for GifRecorder {
    fn write(&mut self, record: Record) {
        for (k, v) in record.iter() {
            if let RecordValue::Video(video) = v {
                if let Err(e) = self.save_video(k, video) {
                    warn!("Failed to save video '{}': {}", k, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VideoFormat;
    use tempdir::TempDir;

    #[test]
    fn test_file_name() {
        assert_eq!(
            GifRecorder::file_name("Episode Video", 3, "gif"),
            "Episode_Video_0003.gif"
        );
    }

    #[test]
    fn test_saves_videos_only() -> Result<()> {
        let dir = TempDir::new("gif_recorder")?;
        let mut recorder = GifRecorder::new(dir.path().join("videos"));
        let mut clip = VideoClip::new(8, VideoFormat::Gif);
        clip.push_frame(vec![128; 3 * 2 * 2], [3, 2, 2])?;

        let mut record = Record::from_scalar("episode", 0.0);
        record.insert("Episode Video", RecordValue::Video(clip));
        recorder.write(record);
        recorder.write(Record::from_scalar("episode", 1.0));

        assert_eq!(recorder.count(), 1);
        assert!(dir.path().join("videos/Episode_Video_0000.gif").exists());
        Ok(())
    }
}
