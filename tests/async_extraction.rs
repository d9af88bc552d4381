//! Background extraction tests.

#![cfg(feature = "async")]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use framesnap::{
    CancellationToken, ExtractOptions, ExtractionRequest, FrameDecoder, FrameExtractor,
    FrameSnapError, ProgressEvent, ProgressStage, SamplingMode,
};
use tokio_stream::StreamExt;

/// Writes an empty file per timestamp.
struct EmptyFileDecoder;

impl FrameDecoder for EmptyFileDecoder {
    fn extract_frames(
        &self,
        _video_reference: &str,
        timestamps_ms: &[u64],
        output_directory: &Path,
        _quality: f64,
    ) -> Result<Vec<PathBuf>, FrameSnapError> {
        let mut written = Vec::with_capacity(timestamps_ms.len());
        for timestamp in timestamps_ms {
            let path = output_directory.join(format!("at_{timestamp}.png"));
            fs::write(&path, b"")?;
            written.push(path);
        }
        Ok(written)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn spawned_run_streams_progress_then_outcome() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let extractor = FrameExtractor::new(EmptyFileDecoder).with_options(
        ExtractOptions::new()
            .with_output_root(temporary_directory.path())
            .with_batch_size(2),
    );
    let request = ExtractionRequest::new("clip.mov", 2.0, SamplingMode::Rate(2.0));

    let mut task = extractor.spawn(request);
    let mut events: Vec<ProgressEvent> = Vec::new();
    while let Some(event) = task.next().await {
        events.push(event);
    }
    let outcome = task.outcome().await.expect("Background run failed");

    assert!(outcome.succeeded);
    assert_eq!(outcome.extracted_count, 5);
    // Preparing plus three batches.
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].stage, ProgressStage::Preparing);
    assert_eq!(events.last().map(|event| event.extracted), Some(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn spawned_run_still_calls_configured_callback() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let extractor = FrameExtractor::new(EmptyFileDecoder).with_options(
        ExtractOptions::new()
            .with_output_root(temporary_directory.path())
            .with_progress(Arc::new(move |_event: &ProgressEvent| {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
    );

    let task = extractor.spawn(ExtractionRequest::new("clip.mov", 1.0, SamplingMode::Rate(1.0)));
    let outcome = task.outcome().await.expect("Background run failed");

    assert!(outcome.succeeded);
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn spawned_run_honours_cancellation() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let token = CancellationToken::new();
    token.cancel();
    let extractor = FrameExtractor::new(EmptyFileDecoder).with_options(
        ExtractOptions::new()
            .with_output_root(temporary_directory.path())
            .with_cancellation(token),
    );

    let task = extractor.spawn(ExtractionRequest::new("clip.mov", 5.0, SamplingMode::Dense));
    let outcome = task.outcome().await.expect("Background run failed");

    assert!(outcome.cancelled);
    assert_eq!(outcome.extracted_count, 0);
}
