//! FFmpeg-backed frame decoding.
//!
//! [`FfmpegFrameDecoder`] implements [`FrameDecoder`] on top of
//! `ffmpeg-next`: it opens the video, seeks to the keyframe before the first
//! requested timestamp, decodes forward, and writes one image per timestamp
//! it reaches. Timestamps past the end of the stream, or frames that fail to
//! convert or encode, are skipped.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framesnap::{FfmpegFrameDecoder, FrameDecoder, FrameImageFormat};
//!
//! let decoder = FfmpegFrameDecoder::new().with_format(FrameImageFormat::Jpeg);
//! let written = decoder.extract_frames("input.mp4", &[0, 500, 1000], Path::new("out"), 0.9)?;
//! println!("{} frames written", written.len());
//! # Ok::<(), framesnap::FrameSnapError>(())
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    iter::Peekable,
    path::{Path, PathBuf},
    str::FromStr,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{
    DynamicImage, RgbImage,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    },
};

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    decoder::FrameDecoder,
    error::FrameSnapError,
    ffmpeg::ensure_initialized,
    utilities::{
        milliseconds_to_seek_target, packed_rgb_rows, pts_to_milliseconds, relative_milliseconds,
        resolve_video_path, stream_start_offset,
    },
};

/// Image encoding used for written frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameImageFormat {
    /// Lossless PNG. The default.
    #[default]
    Png,
    /// Lossy JPEG; quality maps to the JPEG quality scale.
    Jpeg,
}

impl FrameImageFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            FrameImageFormat::Png => "png",
            FrameImageFormat::Jpeg => "jpg",
        }
    }

    /// Encode `image` and write it to `path`.
    ///
    /// PNG ignores fine-grained quality: `quality >= 0.5` selects the best
    /// compression, lower values the fastest.
    fn write(self, image: &DynamicImage, path: &Path, quality: f64) -> Result<(), FrameSnapError> {
        let mut bytes = Vec::new();
        match self {
            FrameImageFormat::Png => {
                let compression = if quality >= 0.5 {
                    CompressionType::Best
                } else {
                    CompressionType::Fast
                };
                image.write_with_encoder(PngEncoder::new_with_quality(
                    &mut bytes,
                    compression,
                    PngFilterType::Adaptive,
                ))?;
            }
            FrameImageFormat::Jpeg => {
                let jpeg_quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
                image.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, jpeg_quality))?;
            }
        }
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Display for FrameImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for FrameImageFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(FrameImageFormat::Png),
            "jpg" | "jpeg" => Ok(FrameImageFormat::Jpeg),
            other => Err(format!("unsupported image format: {other} (expected png or jpg)")),
        }
    }
}

/// [`FrameDecoder`] that decodes with FFmpeg and encodes with `image`.
///
/// Each call opens the video afresh, so one decoder can serve any number of
/// runs. Decoded frames of a batch are held in memory until the batch is
/// written; with the `rayon` feature they are encoded in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegFrameDecoder {
    format: FrameImageFormat,
}

impl FfmpegFrameDecoder {
    /// A decoder writing PNG files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the output image format.
    #[must_use]
    pub fn with_format(mut self, format: FrameImageFormat) -> Self {
        self.format = format;
        self
    }

    /// The configured output image format.
    pub fn format(&self) -> FrameImageFormat {
        self.format
    }

    /// Name a frame is written under before the extractor numbers it.
    fn staging_path(&self, output_directory: &Path, timestamp_ms: u64) -> PathBuf {
        output_directory.join(format!("at_{timestamp_ms:010}ms.{}", self.format.extension()))
    }

    fn write_frames(
        &self,
        captured: Vec<(u64, DynamicImage)>,
        output_directory: &Path,
        quality: f64,
    ) -> Vec<PathBuf> {
        let write = |(timestamp_ms, image): (u64, DynamicImage)| {
            let path = self.staging_path(output_directory, timestamp_ms);
            match self.format.write(&image, &path, quality) {
                Ok(()) => Some(path),
                Err(error) => {
                    log::warn!("Skipping frame at {timestamp_ms} ms: {error}");
                    None
                }
            }
        };

        #[cfg(feature = "rayon")]
        let written = captured.into_par_iter().filter_map(write).collect();
        #[cfg(not(feature = "rayon"))]
        let written = captured.into_iter().filter_map(write).collect();

        written
    }
}

impl FrameDecoder for FfmpegFrameDecoder {
    fn extract_frames(
        &self,
        video_reference: &str,
        timestamps_ms: &[u64],
        output_directory: &Path,
        quality: f64,
    ) -> Result<Vec<PathBuf>, FrameSnapError> {
        if timestamps_ms.is_empty() {
            return Ok(Vec::new());
        }

        ensure_initialized()?;
        let path = resolve_video_path(video_reference)?;
        let mut input =
            ffmpeg_next::format::input(&path).map_err(|error| FrameSnapError::VideoOpen {
                reference: video_reference.to_string(),
                reason: error.to_string(),
            })?;

        let captured = decode_at(&mut input, timestamps_ms)?;
        if captured.len() < timestamps_ms.len() {
            log::debug!(
                "{video_reference}: {} of {} timestamps could not be decoded",
                timestamps_ms.len() - captured.len(),
                timestamps_ms.len(),
            );
        }

        Ok(self.write_frames(captured, output_directory, quality))
    }
}

/// Decode the frames showing at `timestamps_ms` (ascending).
///
/// For each timestamp the first decoded frame whose presentation time is at
/// or after it is captured; one frame can serve several timestamps.
/// Presentation times are measured from the stream's start time, so a
/// container that starts at a non-zero clock still maps 0 ms to its first
/// frame.
fn decode_at(
    input: &mut Input,
    timestamps_ms: &[u64],
) -> Result<Vec<(u64, DynamicImage)>, FrameSnapError> {
    let (stream_index, time_base, start, mut decoder) = {
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(FrameSnapError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        (
            stream.index(),
            stream.time_base(),
            stream_start_offset(stream.start_time()),
            decoder_context.decoder().video()?,
        )
    };

    let mut scaler = ScalingContext::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        Pixel::RGB24,
        decoder.width(),
        decoder.height(),
        ScalingFlags::BILINEAR,
    )?;

    let mut pending = timestamps_ms.iter().copied().peekable();
    let mut captured = Vec::with_capacity(timestamps_ms.len());

    let Some(&first) = timestamps_ms.first() else {
        return Ok(captured);
    };
    // Targets are relative to the first frame; seeks use absolute time.
    let start_ms = pts_to_milliseconds(start, time_base);
    let seek_target = milliseconds_to_seek_target(first.saturating_add(start_ms));
    if let Err(error) = input.seek(seek_target, ..seek_target) {
        log::debug!("Seek to {first} ms failed, nothing to decode: {error}");
        return Ok(captured);
    }

    for (stream, packet) in input.packets() {
        if pending.peek().is_none() {
            break;
        }
        if stream.index() != stream_index {
            continue;
        }
        if let Err(error) = decoder.send_packet(&packet) {
            log::debug!("Dropping undecodable packet: {error}");
            continue;
        }
        drain_decoder(
            &mut decoder,
            &mut scaler,
            start,
            time_base,
            &mut pending,
            &mut captured,
        );
    }

    if pending.peek().is_some() {
        decoder.send_eof()?;
        drain_decoder(
            &mut decoder,
            &mut scaler,
            start,
            time_base,
            &mut pending,
            &mut captured,
        );
    }

    Ok(captured)
}

/// Pull every available frame out of the decoder and capture the pending
/// timestamps it covers.
fn drain_decoder<I: Iterator<Item = u64>>(
    decoder: &mut VideoDecoder,
    scaler: &mut ScalingContext,
    start: i64,
    time_base: Rational,
    pending: &mut Peekable<I>,
    captured: &mut Vec<(u64, DynamicImage)>,
) {
    let mut decoded = VideoFrame::empty();

    while pending.peek().is_some() && decoder.receive_frame(&mut decoded).is_ok() {
        let Some(pts) = decoded.timestamp().or_else(|| decoded.pts()) else {
            continue;
        };
        let frame_ms = relative_milliseconds(pts, start, time_base);

        if pending.peek().is_none_or(|&target| target > frame_ms) {
            continue;
        }

        match to_image(scaler, &decoded) {
            Ok(image) => {
                while let Some(target) = pending.next_if(|&target| target <= frame_ms) {
                    captured.push((target, image.clone()));
                }
            }
            Err(error) => {
                while let Some(target) = pending.next_if(|&target| target <= frame_ms) {
                    log::debug!("Skipping frame at {target} ms: {error}");
                }
            }
        }
    }
}

fn to_image(
    scaler: &mut ScalingContext,
    decoded: &VideoFrame,
) -> Result<DynamicImage, FrameSnapError> {
    let mut rgb_frame = VideoFrame::empty();
    scaler.run(decoded, &mut rgb_frame)?;

    let (width, height) = (rgb_frame.width(), rgb_frame.height());
    let buffer = packed_rgb_rows(&rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        FrameSnapError::FfmpegError("decoded frame does not fill an RGB image".to_string())
    })?;

    Ok(DynamicImage::ImageRgb8(rgb_image))
}
