//! The frame decoding seam.
//!
//! [`FrameExtractor`](crate::FrameExtractor) hands each batch of timestamps
//! to a [`FrameDecoder`] and only looks at the list of files it returns.
//! [`FfmpegFrameDecoder`](crate::FfmpegFrameDecoder) is the implementation
//! shipped with the crate.

use std::path::{Path, PathBuf};

use crate::error::FrameSnapError;

/// Renders still images from a video at given millisecond offsets.
///
/// Contract:
///
/// - Returns one path per timestamp it could render, in timestamp order.
/// - Timestamps it cannot render (past the end, corrupt region) are skipped
///   silently; they are simply absent from the result.
/// - Returns an error only when the call as a whole fails, e.g. the video
///   cannot be opened.
/// - Writes every frame into `output_directory` under a name that is unique
///   for the whole run and does not start with `frame_`. The extractor
///   renames the files into the final `frame_NNNNN` sequence.
///
/// The call blocks until the whole batch is written. Implementations may use
/// worker threads internally.
pub trait FrameDecoder: Send + Sync {
    /// Render `timestamps_ms` from `video_reference` into `output_directory`.
    ///
    /// `quality` lies in `(0, 1]`.
    fn extract_frames(
        &self,
        video_reference: &str,
        timestamps_ms: &[u64],
        output_directory: &Path,
        quality: f64,
    ) -> Result<Vec<PathBuf>, FrameSnapError>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for Box<D> {
    fn extract_frames(
        &self,
        video_reference: &str,
        timestamps_ms: &[u64],
        output_directory: &Path,
        quality: f64,
    ) -> Result<Vec<PathBuf>, FrameSnapError> {
        (**self).extract_frames(video_reference, timestamps_ms, output_directory, quality)
    }
}
