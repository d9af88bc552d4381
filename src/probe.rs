//! Lightweight video probing.
//!
//! Extraction needs the video's duration to plan timestamps. Callers that
//! do not already know it (the command-line front end, for one) can read it
//! from the container with [`probe_duration`].

use std::time::Duration;

use ffmpeg_next::media::Type;

use crate::{error::FrameSnapError, ffmpeg::ensure_initialized, utilities::resolve_video_path};

/// Read the duration of a video in seconds.
///
/// Uses the container duration, falling back to the duration of the best
/// video stream when the container does not record one.
///
/// # Errors
///
/// - [`FrameSnapError::VideoOpen`] if the file cannot be opened.
/// - [`FrameSnapError::UnsupportedSource`] for photo-library references.
/// - [`FrameSnapError::NoVideoStream`] if the file has no video stream.
///
/// # Example
///
/// ```no_run
/// let seconds = framesnap::probe_duration("input.mp4")?;
/// println!("{seconds:.2}s");
/// # Ok::<(), framesnap::FrameSnapError>(())
/// ```
pub fn probe_duration(video_reference: &str) -> Result<f64, FrameSnapError> {
    ensure_initialized()?;
    let path = resolve_video_path(video_reference)?;

    log::debug!("Probing {}", path.display());

    let input = ffmpeg_next::format::input(&path).map_err(|error| FrameSnapError::VideoOpen {
        reference: video_reference.to_string(),
        reason: error.to_string(),
    })?;

    let stream = input
        .streams()
        .best(Type::Video)
        .ok_or(FrameSnapError::NoVideoStream)?;

    let container_microseconds = input.duration();
    if container_microseconds > 0 {
        return Ok(Duration::from_micros(container_microseconds as u64).as_secs_f64());
    }

    let time_base = stream.time_base();
    if time_base.denominator() == 0 {
        return Ok(0.0);
    }
    let stream_duration = stream.duration().max(0) as f64;
    Ok(stream_duration * f64::from(time_base.numerator()) / f64::from(time_base.denominator()))
}
