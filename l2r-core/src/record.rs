//! Types and traits for recording metrics and videos.
//!
//! # Core Components
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - The values that can be stored in a [`Record`]
//! * [`VideoClip`] - A sequence of channel-first frames, encodable to GIF
//! * [`Recorder`] - Writes records to an output destination, best-effort
//! * [`AggregateRecorder`] - Stores records and writes their aggregation
//! * [`RecordStorage`] - Aggregation of stored records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards all records
//! * [`GifRecorder`] - Saves videos in records as GIF files
//! * [`AsyncRecorder`] - Writes records on a worker thread
//!
//! # Basic Usage
//!
//! ```rust
//! use l2r_core::record::{Record, RecordValue};
//!
//! let episode = 3;
//! let episode_return = 12.5f32;
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(episode as f32));
//! record.insert("episode_return", RecordValue::Scalar(episode_return));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), 12.5);
//! ```
mod async_recorder;
mod base;
mod buffered_recorder;
mod gif_recorder;
mod null_recorder;
mod recorder;
mod storage;
mod video;

pub use async_recorder::AsyncRecorder;
pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use gif_recorder::GifRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
pub use video::{VideoClip, VideoFormat};
