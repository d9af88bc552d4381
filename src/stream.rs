//! Background extraction for async callers.
//!
//! [`FrameExtractor::spawn`] moves an extraction run onto
//! `tokio::task::spawn_blocking` and returns an [`ExtractionTask`]: a
//! [`Stream`] of [`ProgressEvent`]s that ends when the run finishes, plus
//! [`ExtractionTask::outcome`] to await the final result. The run itself is
//! the same sequential batch loop as [`FrameExtractor::run`].
//!
//! # Example
//!
//! ```no_run
//! use tokio_stream::StreamExt;
//!
//! use framesnap::{
//!     ExtractionRequest, FfmpegFrameDecoder, FrameExtractor, FrameSnapError, SamplingMode,
//! };
//!
//! # async fn example() -> Result<(), FrameSnapError> {
//! let extractor = FrameExtractor::new(FfmpegFrameDecoder::new());
//! let request = ExtractionRequest::new("input.mp4", 30.0, SamplingMode::Rate(1.0));
//!
//! let mut task = extractor.spawn(request);
//! while let Some(event) = task.next().await {
//!     println!("{event}");
//! }
//! let outcome = task.outcome().await?;
//! println!("{} frames", outcome.extracted_count);
//! # Ok(())
//! # }
//! ```

use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tokio::{
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
    task::JoinHandle,
};
use tokio_stream::Stream;

use crate::{
    decoder::FrameDecoder,
    error::FrameSnapError,
    extractor::FrameExtractor,
    outcome::ExtractionOutcome,
    progress::ProgressEvent,
    request::ExtractionRequest,
};

/// A running background extraction.
///
/// Polling the stream yields progress events in the order the run emits
/// them. Events are buffered, so the run never waits for the consumer.
pub struct ExtractionTask {
    receiver: UnboundedReceiver<ProgressEvent>,
    handle: JoinHandle<ExtractionOutcome>,
}

impl Stream for ExtractionTask {
    type Item = ProgressEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl ExtractionTask {
    /// Wait for the run to finish and return its outcome.
    ///
    /// Events not yet consumed from the stream are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSnapError::Cancelled`] if the background task was
    /// aborted or panicked.
    pub async fn outcome(self) -> Result<ExtractionOutcome, FrameSnapError> {
        self.handle.await.map_err(|error| {
            log::error!("Background extraction did not complete: {error}");
            FrameSnapError::Cancelled
        })
    }
}

impl<D: FrameDecoder + 'static> FrameExtractor<D> {
    /// Run [`FrameExtractor::run`] on a blocking thread.
    ///
    /// The configured progress callback still receives every event; the
    /// returned task receives a copy. Must be called from within a Tokio
    /// runtime.
    pub fn spawn(mut self, request: ExtractionRequest) -> ExtractionTask {
        let (sender, receiver) = unbounded_channel();

        let observer = Arc::clone(&self.options().progress);
        self.options_mut().progress = Arc::new(move |event: &ProgressEvent| {
            observer.on_progress(event);
            // The consumer may have dropped the stream and kept only the outcome.
            let _ = sender.send(event.clone());
        });

        let handle = tokio::task::spawn_blocking(move || self.run(&request));

        ExtractionTask { receiver, handle }
    }
}
