//! Extraction configuration.
//!
//! [`ExtractOptions`] is a builder that threads the progress callback,
//! cancellation token, batch size, output quality, and output root through a
//! [`FrameExtractor`](crate::FrameExtractor) without widening every
//! signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesnap::{CancellationToken, ExtractOptions, ProgressEvent};
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_progress(Arc::new(|event: &ProgressEvent| eprintln!("{event}")))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(20)
//!     .with_output_root("/tmp/frames");
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::PathBuf,
    sync::Arc,
};

use crate::{
    error::FrameSnapError,
    namespace::default_output_root,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// Number of timestamps handed to the decoder per call unless configured
/// otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Output quality passed to the decoder unless configured otherwise.
pub const DEFAULT_QUALITY: f64 = 1.0;

/// Settings for one or more extraction runs.
///
/// A default-constructed value reports nothing, cannot be cancelled, sends
/// batches of [`DEFAULT_BATCH_SIZE`] at [`DEFAULT_QUALITY`], and creates
/// output folders under [`default_output_root`].
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: usize,
    pub(crate) quality: f64,
    pub(crate) output_root: PathBuf,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("quality", &self.quality)
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: DEFAULT_BATCH_SIZE,
            quality: DEFAULT_QUALITY,
            output_root: default_output_root(),
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before every batch.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how many timestamps go to the decoder per call.
    ///
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the output quality passed to the decoder. Must lie in `(0, 1]`;
    /// checked by [`validate`](ExtractOptions::validate).
    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Set the directory under which per-run output folders are created.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.output_root = root.into();
        self
    }

    /// The configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The configured output quality.
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// The configured output root.
    pub fn output_root(&self) -> &std::path::Path {
        &self.output_root
    }

    /// Check settings that cannot be clamped.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSnapError::InvalidQuality`] if the quality lies outside
    /// `(0, 1]`.
    pub fn validate(&self) -> Result<(), FrameSnapError> {
        if self.quality > 0.0 && self.quality <= 1.0 {
            Ok(())
        } else {
            Err(FrameSnapError::InvalidQuality(self.quality))
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
