//! Timestamp planning.
//!
//! Converts a video duration and a [`SamplingMode`] into the ordered list of
//! capture instants (milliseconds from the start of the video), and splits
//! that list into decoder batches.
//!
//! # Example
//!
//! ```
//! use framesnap::{SamplingMode, plan_timestamps};
//!
//! let timestamps = plan_timestamps(3.0, SamplingMode::Rate(1.0))?;
//! assert_eq!(timestamps, vec![0, 1000, 2000, 3000]);
//! # Ok::<(), framesnap::FrameSnapError>(())
//! ```

use std::slice::Chunks;

use crate::error::FrameSnapError;

/// Effective rate used by [`SamplingMode::Dense`], in samples per second.
///
/// Dense sampling is a fixed 30 Hz grid, not every decoded frame of the
/// source video.
pub const DENSE_SAMPLE_RATE: f64 = 30.0;

/// Upper bound on the capacity reserved up front for a timestamp plan.
const MAX_PREALLOCATED_TIMESTAMPS: usize = 1 << 16;

/// How capture instants are spaced across the video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingMode {
    /// Capture `n` frames per second of video.
    Rate(f64),
    /// Capture at [`DENSE_SAMPLE_RATE`].
    Dense,
}

impl SamplingMode {
    /// The number of captures per second this mode stands for.
    pub fn effective_rate(self) -> f64 {
        match self {
            SamplingMode::Rate(rate) => rate,
            SamplingMode::Dense => DENSE_SAMPLE_RATE,
        }
    }

    /// Returns the effective rate, or an error if it is not a finite
    /// positive number.
    pub(crate) fn validated_rate(self) -> Result<f64, FrameSnapError> {
        let rate = self.effective_rate();
        if rate.is_finite() && rate > 0.0 {
            Ok(rate)
        } else {
            Err(FrameSnapError::InvalidSampleRate(rate))
        }
    }
}

pub(crate) fn validate_duration(duration_seconds: f64) -> Result<(), FrameSnapError> {
    if duration_seconds.is_finite() && duration_seconds >= 0.0 {
        Ok(())
    } else {
        Err(FrameSnapError::InvalidDuration(duration_seconds))
    }
}

/// Nominal number of captures for a duration and rate:
/// `floor(duration * rate) + 1`.
///
/// Floating-point accumulation in [`plan_timestamps`] can make the real plan
/// one entry shorter or longer.
///
/// # Errors
///
/// Same validation as [`plan_timestamps`].
pub fn planned_frame_count(
    duration_seconds: f64,
    sampling: SamplingMode,
) -> Result<u64, FrameSnapError> {
    validate_duration(duration_seconds)?;
    let rate = sampling.validated_rate()?;
    Ok((duration_seconds * rate).floor() as u64 + 1)
}

/// Plan the capture instants for a video.
///
/// Starting at `t = 0`, emits `round(t * 1000)` and advances by
/// `1 / rate` seconds while `t <= duration_seconds`. The result is never
/// empty, starts at `0`, and is strictly ascending. Instants that round to
/// the same millisecond as their predecessor are dropped.
///
/// # Errors
///
/// - [`FrameSnapError::InvalidDuration`] if `duration_seconds` is negative
///   or not finite.
/// - [`FrameSnapError::InvalidSampleRate`] if the rate is not a finite
///   positive number.
pub fn plan_timestamps(
    duration_seconds: f64,
    sampling: SamplingMode,
) -> Result<Vec<u64>, FrameSnapError> {
    let estimate = planned_frame_count(duration_seconds, sampling)?;
    let interval = 1.0 / sampling.validated_rate()?;

    let capacity = usize::try_from(estimate)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATED_TIMESTAMPS);
    let mut timestamps: Vec<u64> = Vec::with_capacity(capacity);

    let mut seconds = 0.0_f64;
    while seconds <= duration_seconds {
        let milliseconds = (seconds * 1000.0).round() as u64;
        if timestamps.last().is_none_or(|&last| milliseconds > last) {
            timestamps.push(milliseconds);
        }

        let next = seconds + interval;
        // The step vanished against the magnitude of `seconds`.
        if next <= seconds {
            break;
        }
        seconds = next;
    }

    log::debug!(
        "Planned {} timestamps for {duration_seconds}s at {} Hz",
        timestamps.len(),
        sampling.effective_rate(),
    );

    Ok(timestamps)
}

/// Split a timestamp plan into consecutive decoder batches.
///
/// Every batch holds `batch_size` timestamps except possibly the last.
/// A `batch_size` of zero is treated as one.
pub fn partition_batches(timestamps: &[u64], batch_size: usize) -> Chunks<'_, u64> {
    timestamps.chunks(batch_size.max(1))
}
