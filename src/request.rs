//! Extraction requests.

use crate::{
    error::FrameSnapError,
    planner::{SamplingMode, validate_duration},
};

/// What to extract: which video, how long it is, and how densely to sample.
///
/// # Example
///
/// ```
/// use framesnap::{ExtractionRequest, SamplingMode};
///
/// let request = ExtractionRequest::new("clips/My Trip.MOV", 12.5, SamplingMode::Rate(2.0));
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    /// Path or `file://` URL of the video.
    pub video_reference: String,
    /// Length of the video in seconds.
    pub duration_seconds: f64,
    /// Sampling policy.
    pub sampling: SamplingMode,
}

impl ExtractionRequest {
    /// Build a request.
    pub fn new<S: Into<String>>(
        video_reference: S,
        duration_seconds: f64,
        sampling: SamplingMode,
    ) -> Self {
        Self {
            video_reference: video_reference.into(),
            duration_seconds,
            sampling,
        }
    }

    /// Check the request invariants.
    ///
    /// # Errors
    ///
    /// - [`FrameSnapError::InvalidDuration`] if the duration is negative or
    ///   not finite.
    /// - [`FrameSnapError::InvalidSampleRate`] if the rate is not a finite
    ///   positive number.
    pub fn validate(&self) -> Result<(), FrameSnapError> {
        validate_duration(self.duration_seconds)?;
        self.sampling.validated_rate()?;
        Ok(())
    }
}
