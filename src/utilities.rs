//! Internal utility functions.
//!
//! Helpers for resolving video references, converting between FFmpeg
//! timestamps and milliseconds, and repacking decoded pixel data.

use std::path::PathBuf;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use percent_encoding::percent_decode_str;

use crate::error::FrameSnapError;

/// Reference prefixes for photo-library assets, which have to be copied to
/// a real file before FFmpeg can read them.
const LIBRARY_ASSET_SCHEMES: [&str; 2] = ["ph://", "assets-library://"];

/// Format-level seeks are expressed in `AV_TIME_BASE` units (microseconds).
const MICROSECONDS_PER_MILLISECOND: i64 = 1_000;

/// Turn a video reference (plain path or `file://` URL) into a local path.
pub(crate) fn resolve_video_path(video_reference: &str) -> Result<PathBuf, FrameSnapError> {
    if LIBRARY_ASSET_SCHEMES
        .iter()
        .any(|scheme| video_reference.starts_with(scheme))
    {
        return Err(FrameSnapError::UnsupportedSource(video_reference.to_string()));
    }

    let Some(location) = video_reference.strip_prefix("file://") else {
        return Ok(PathBuf::from(video_reference));
    };

    let location = location.strip_prefix("localhost").unwrap_or(location);
    let decoded = percent_decode_str(location).decode_utf8_lossy();
    if decoded.is_empty() {
        return Err(FrameSnapError::VideoOpen {
            reference: video_reference.to_string(),
            reason: "Invalid video URL".to_string(),
        });
    }

    Ok(PathBuf::from(decoded.into_owned()))
}

/// Convert a stream timestamp to whole milliseconds, clamping negative
/// values to zero.
pub(crate) fn pts_to_milliseconds(pts: i64, time_base: Rational) -> u64 {
    let seconds =
        pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator());
    (seconds * 1000.0).round().max(0.0) as u64
}

/// A stream's start time in stream units. FFmpeg reports an unknown start
/// as `i64::MIN` (`AV_NOPTS_VALUE`); unknown and negative starts count as
/// zero.
pub(crate) fn stream_start_offset(start_time: i64) -> i64 {
    start_time.max(0)
}

/// Milliseconds of `pts` measured from the stream's first frame.
pub(crate) fn relative_milliseconds(pts: i64, start: i64, time_base: Rational) -> u64 {
    pts_to_milliseconds(pts.saturating_sub(start), time_base)
}

/// Convert milliseconds to a format-level seek target.
pub(crate) fn milliseconds_to_seek_target(milliseconds: u64) -> i64 {
    i64::try_from(milliseconds)
        .unwrap_or(i64::MAX / MICROSECONDS_PER_MILLISECOND)
        .saturating_mul(MICROSECONDS_PER_MILLISECOND)
}

/// Copy the first plane of a packed RGB24 frame into a buffer without row
/// padding, ready for [`image::RgbImage::from_raw`].
pub(crate) fn packed_rgb_rows(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let row_length = width as usize * 3;
    let rows = height as usize;
    let stride = video_frame.stride(0);
    let data = video_frame.data(0);

    if stride == row_length {
        return data[..row_length * rows].to_vec();
    }

    data.chunks(stride)
        .take(rows)
        .flat_map(|row| &row[..row_length.min(row.len())])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ffmpeg_next::Rational;

    use super::{
        milliseconds_to_seek_target, pts_to_milliseconds, relative_milliseconds,
        resolve_video_path, stream_start_offset,
    };
    use crate::error::FrameSnapError;

    #[test]
    fn plain_paths_pass_through() {
        let path = resolve_video_path("clips/My Trip.MOV").unwrap();
        assert_eq!(path, PathBuf::from("clips/My Trip.MOV"));
    }

    #[test]
    fn file_urls_are_percent_decoded() {
        let path = resolve_video_path("file:///Users/sam/My%20Trip.MOV").unwrap();
        assert_eq!(path, PathBuf::from("/Users/sam/My Trip.MOV"));

        let localhost = resolve_video_path("file://localhost/tmp/clip.mp4").unwrap();
        assert_eq!(localhost, PathBuf::from("/tmp/clip.mp4"));
    }

    #[test]
    fn library_assets_are_rejected() {
        assert!(matches!(
            resolve_video_path("ph://F2A9-11/L0/001"),
            Err(FrameSnapError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(pts_to_milliseconds(1_500, Rational::new(1, 1_000)), 1_500);
        assert_eq!(pts_to_milliseconds(45_000, Rational::new(1, 90_000)), 500);
        assert_eq!(pts_to_milliseconds(-10, Rational::new(1, 1_000)), 0);
        assert_eq!(milliseconds_to_seek_target(2_000), 2_000_000);
    }

    #[test]
    fn timestamps_are_measured_from_stream_start() {
        let time_base = Rational::new(1, 90_000);
        let start = stream_start_offset(90_000);

        assert_eq!(relative_milliseconds(90_000, start, time_base), 0);
        assert_eq!(relative_milliseconds(90_000 + 45_000, start, time_base), 500);
        // Packets before the start clamp to zero.
        assert_eq!(relative_milliseconds(0, start, time_base), 0);
    }

    #[test]
    fn unknown_stream_start_counts_as_zero() {
        assert_eq!(stream_start_offset(i64::MIN), 0);
        assert_eq!(stream_start_offset(-1_024), 0);
        let start = stream_start_offset(i64::MIN);
        assert_eq!(relative_milliseconds(1_500, start, Rational::new(1, 1_000)), 1_500);
    }
}
