//! ExtractOptions and ExtractionRequest tests.

use std::path::Path;
use std::sync::Arc;

use framesnap::{
    CancellationToken, DEFAULT_BATCH_SIZE, DEFAULT_QUALITY, ExtractOptions, ExtractionRequest,
    FrameSnapError, ProgressEvent, SamplingMode, default_output_root,
};

// ── ExtractOptions builder ───────────────────────────────────────

#[test]
fn config_defaults() {
    let config = ExtractOptions::new();
    assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
    assert_eq!(config.batch_size(), 10);
    assert_eq!(config.quality(), DEFAULT_QUALITY);
    assert_eq!(config.output_root(), default_output_root());

    let debug = format!("{config:?}");
    assert!(debug.contains("ExtractOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 10"));
}

#[test]
fn config_with_batch_size() {
    let config = ExtractOptions::new().with_batch_size(25);
    assert_eq!(config.batch_size(), 25);
}

#[test]
fn config_with_batch_size_clamps_zero() {
    let config = ExtractOptions::new().with_batch_size(0);
    // Clamped to 1.
    assert_eq!(config.batch_size(), 1);
}

#[test]
fn config_with_output_root() {
    let config = ExtractOptions::new().with_output_root("/tmp/frames");
    assert_eq!(config.output_root(), Path::new("/tmp/frames"));
}

#[test]
fn config_with_cancellation_shows_in_debug() {
    let config = ExtractOptions::new().with_cancellation(CancellationToken::new());
    assert!(format!("{config:?}").contains("has_cancellation: true"));
}

#[test]
fn config_with_progress_is_cloneable() {
    let config = ExtractOptions::new().with_progress(Arc::new(|_event: &ProgressEvent| {}));
    let copy = config.clone();
    assert_eq!(copy.batch_size(), config.batch_size());
}

// ── Quality ──────────────────────────────────────────────────────

#[test]
fn quality_in_range_accepted() {
    for quality in [0.01, 0.5, 1.0] {
        let config = ExtractOptions::new().with_quality(quality);
        assert!(config.validate().is_ok(), "quality {quality} should be accepted");
    }
}

#[test]
fn quality_out_of_range_rejected() {
    for quality in [0.0, -0.2, 1.01, f64::NAN] {
        let config = ExtractOptions::new().with_quality(quality);
        assert!(
            matches!(config.validate(), Err(FrameSnapError::InvalidQuality(_))),
            "quality {quality} should be rejected",
        );
    }
}

// ── ExtractionRequest ────────────────────────────────────────────

#[test]
fn request_accepts_zero_duration() {
    let request = ExtractionRequest::new("clip.mov", 0.0, SamplingMode::Dense);
    assert!(request.validate().is_ok());
}

#[test]
fn request_rejects_bad_duration() {
    let request = ExtractionRequest::new("clip.mov", -0.1, SamplingMode::Rate(1.0));
    assert!(matches!(request.validate(), Err(FrameSnapError::InvalidDuration(_))));
}

#[test]
fn request_rejects_bad_rate() {
    let request = ExtractionRequest::new("clip.mov", 10.0, SamplingMode::Rate(-1.0));
    assert!(matches!(request.validate(), Err(FrameSnapError::InvalidSampleRate(_))));
}

#[test]
fn request_keeps_reference_verbatim() {
    let reference = String::from("file:///a%20b.mov");
    let request = ExtractionRequest::new(reference, 1.0, SamplingMode::Dense);
    assert_eq!(request.video_reference, "file:///a%20b.mov");
    assert_eq!(request.sampling, SamplingMode::Dense);
}
