//! Progress reporting and cancellation support.
//!
//! An extraction run reports through a [`ProgressCallback`]: once before the
//! first batch and once after every batch, successful or not. Each
//! [`ProgressEvent`] renders as a human-readable line through [`Display`].
//! A [`CancellationToken`] lets another thread stop a run between batches.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesnap::{ExtractOptions, ProgressEvent};
//!
//! let options = ExtractOptions::new()
//!     .with_progress(Arc::new(|event: &ProgressEvent| println!("{event}")));
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Which point of a run an event was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressStage {
    /// Timestamps are planned; no batch has run yet.
    Preparing,
    /// A batch was attempted.
    BatchFinished,
}

/// A snapshot of a running extraction.
///
/// `extracted` never decreases from one event to the next.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Where in the run this event was emitted.
    pub stage: ProgressStage,
    /// Frames written so far.
    pub extracted: u64,
    /// Frames planned for the whole run.
    pub planned: u64,
    /// Batches attempted so far.
    pub batches_done: usize,
    /// Batches in the whole run.
    pub batch_count: usize,
    /// Why the batch that triggered this event failed, if it did.
    pub batch_error: Option<String>,
    /// Share of batches attempted (0.0 – 100.0); `None` for an empty run.
    pub percentage: Option<f32>,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
    /// Estimated time left, from the average batch duration so far.
    pub estimated_remaining: Option<Duration>,
}

impl Display for ProgressEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.stage {
            ProgressStage::Preparing => {
                write!(f, "Preparing to extract {} frames...", self.planned)
            }
            ProgressStage::BatchFinished => {
                write!(f, "Extracted {} / {} frames...", self.extracted, self.planned)
            }
        }
    }
}

/// Receives progress events during extraction.
///
/// Callbacks observe the run but cannot influence it; use a
/// [`CancellationToken`] to stop a run. Any `Fn(&ProgressEvent)` closure that
/// is `Send + Sync` implements this trait.
pub trait ProgressCallback: Send + Sync {
    /// Called before the first batch and after every batch.
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressCallback for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards all events. The default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Cooperative cancellation flag shared between clones.
///
/// The extractor checks the token before starting each batch; a batch that
/// is already running always completes.
///
/// # Example
///
/// ```
/// use framesnap::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Tracks timing for one run and builds events for the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    planned: u64,
    batch_count: usize,
    batches_done: usize,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        planned: u64,
        batch_count: usize,
    ) -> Self {
        Self {
            callback,
            planned,
            batch_count,
            batches_done: 0,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn preparing(&self) {
        self.report(ProgressStage::Preparing, 0, None);
    }

    pub(crate) fn batch_finished(&mut self, extracted: u64, batch_error: Option<String>) {
        self.batches_done += 1;
        self.report(ProgressStage::BatchFinished, extracted, batch_error);
    }

    fn report(&self, stage: ProgressStage, extracted: u64, batch_error: Option<String>) {
        let elapsed = self.start_time.elapsed();

        let percentage = (self.batch_count > 0)
            .then(|| self.batches_done as f32 / self.batch_count as f32 * 100.0);

        let estimated_remaining = (self.batches_done > 0).then(|| {
            let remaining = self.batch_count.saturating_sub(self.batches_done) as u32;
            elapsed / self.batches_done as u32 * remaining
        });

        let event = ProgressEvent {
            stage,
            extracted,
            planned: self.planned,
            batches_done: self.batches_done,
            batch_count: self.batch_count,
            batch_error,
            percentage,
            elapsed,
            estimated_remaining,
        };

        self.callback.on_progress(&event);
    }
}
