//! # framesnap
//!
//! Extract still frames from a video at a chosen sampling rate into a
//! dedicated, uniquely named folder of numbered images.
//!
//! A run plans capture instants from the video's duration, hands them to a
//! [`FrameDecoder`] in small batches, renames whatever the decoder produced
//! into a gap-free `frame_00001.png`, `frame_00002.png`, ... sequence, and
//! reports progress after every batch. A batch that fails is logged and
//! skipped; the run still succeeds with fewer frames.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framesnap::{
//!     ExtractOptions, ExtractionRequest, FfmpegFrameDecoder, FrameExtractor, SamplingMode,
//! };
//!
//! let duration = framesnap::probe_duration("input.mp4")?;
//! let request = ExtractionRequest::new("input.mp4", duration, SamplingMode::Rate(2.0));
//!
//! let extractor = FrameExtractor::new(FfmpegFrameDecoder::new())
//!     .with_options(ExtractOptions::new().with_output_root("screenshots"));
//! let outcome = extractor.run(&request);
//!
//! if outcome.succeeded {
//!     println!("{} frames in {}", outcome.extracted_count, outcome.output_directory.display());
//! }
//! # Ok::<(), framesnap::FrameSnapError>(())
//! ```
//!
//! ## Building blocks
//!
//! - [`plan_timestamps`]: capture instants for a duration and
//!   [`SamplingMode`]
//! - [`partition_batches`]: fixed-size decoder batches
//! - [`OutputNamespace`]: per-run folder naming and creation
//! - [`FrameExtractor`]: the batch loop, with injected [`FrameDecoder`] and
//!   [`Storage`]
//! - [`FfmpegFrameDecoder`]: FFmpeg-backed decoder writing PNG or JPEG
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `FrameExtractor::spawn` runs an extraction on a Tokio blocking thread |
//! | `rayon` | Encode the images of a batch in parallel |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod config;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod ffmpeg_decoder;
pub mod namespace;
pub mod outcome;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod request;
pub mod storage;
#[cfg(feature = "async")]
pub mod stream;
mod utilities;

pub use config::{DEFAULT_BATCH_SIZE, DEFAULT_QUALITY, ExtractOptions};
pub use decoder::FrameDecoder;
pub use error::FrameSnapError;
pub use extractor::{FrameExtractor, frame_file_name};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use ffmpeg_decoder::{FfmpegFrameDecoder, FrameImageFormat};
pub use namespace::{OutputNamespace, default_output_root, sanitize_folder_name};
pub use outcome::ExtractionOutcome;
pub use planner::{
    DENSE_SAMPLE_RATE, SamplingMode, partition_batches, plan_timestamps, planned_frame_count,
};
pub use probe::probe_duration;
pub use progress::{CancellationToken, ProgressCallback, ProgressEvent, ProgressStage};
pub use request::ExtractionRequest;
pub use storage::{LocalStorage, Storage};
#[cfg(feature = "async")]
pub use stream::ExtractionTask;
