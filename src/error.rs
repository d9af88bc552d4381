//! Error types for the `framesnap` crate.
//!
//! This module defines [`FrameSnapError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the offending path,
//! video reference, or value so a caller can report them without extra
//! context.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framesnap` operations.
///
/// Batch-level decoder failures are absorbed by the
/// [`FrameExtractor`](crate::FrameExtractor) and only show up in logs and
/// progress events; setup failures end up in
/// [`ExtractionOutcome::error_message`](crate::ExtractionOutcome).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameSnapError {
    /// The video duration is negative, NaN, or infinite.
    #[error("Invalid duration: {0} seconds (must be finite and non-negative)")]
    InvalidDuration(f64),

    /// The sampling rate is zero, negative, NaN, or infinite.
    #[error("Invalid sample rate: {0} (must be finite and greater than zero)")]
    InvalidSampleRate(f64),

    /// The output quality lies outside `(0, 1]`.
    #[error("Invalid quality: {0} (must be in the range (0, 1])")]
    InvalidQuality(f64),

    /// A directory could not be created or a file could not be moved.
    #[error("Storage error at {path}: {reason}")]
    Storage {
        /// Path the storage operation was acting on.
        path: PathBuf,
        /// Underlying reason the operation failed.
        reason: String,
    },

    /// The video could not be opened at all.
    #[error("Failed to open video {reference}: {reason}")]
    VideoOpen {
        /// The video reference handed to the decoder.
        reference: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The video reference uses a scheme the decoder cannot read directly
    /// (for example a photo-library asset URL).
    #[error("Unsupported video source: {0} (copy the video to local storage first)")]
    UnsupportedSource(String),

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The run was stopped through a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FrameSnapError {
    fn from(error: FfmpegError) -> Self {
        FrameSnapError::FfmpegError(error.to_string())
    }
}
