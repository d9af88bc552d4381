//! The terminal result of an extraction run.

use std::path::PathBuf;

use serde_json::{Value, json};

/// Result of one extraction run.
///
/// `succeeded` is `false` only when setup failed (invalid request, output
/// directory not creatable) or the run was cancelled. A successful outcome
/// may still have `extracted_count < planned_count`: failed batches and
/// timestamps the decoder could not render are not errors.
///
/// A frame whose rename into the numbered sequence fails stays in
/// `output_directory` under the name the decoder gave it. It is not counted
/// and not listed in `frames`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ExtractionOutcome {
    /// Whether the run went through every batch.
    pub succeeded: bool,
    /// Whether the run was stopped through a cancellation token.
    pub cancelled: bool,
    /// Frames written to the output directory.
    pub extracted_count: u64,
    /// Timestamps planned for the run.
    pub planned_count: u64,
    /// Batches whose decoder call failed as a whole.
    pub failed_batches: u64,
    /// Final paths of the written frames, in order.
    pub frames: Vec<PathBuf>,
    /// The run's output directory.
    pub output_directory: PathBuf,
    /// Why the run failed; `None` on success.
    pub error_message: Option<String>,
}

impl ExtractionOutcome {
    pub(crate) fn completed(
        output_directory: PathBuf,
        planned_count: u64,
        frames: Vec<PathBuf>,
        failed_batches: u64,
    ) -> Self {
        Self {
            succeeded: true,
            cancelled: false,
            extracted_count: frames.len() as u64,
            planned_count,
            failed_batches,
            frames,
            output_directory,
            error_message: None,
        }
    }

    pub(crate) fn failed<M: Into<String>>(output_directory: PathBuf, message: M) -> Self {
        Self {
            succeeded: false,
            cancelled: false,
            extracted_count: 0,
            planned_count: 0,
            failed_batches: 0,
            frames: Vec::new(),
            output_directory,
            error_message: Some(message.into()),
        }
    }

    pub(crate) fn cancelled(
        output_directory: PathBuf,
        planned_count: u64,
        frames: Vec<PathBuf>,
        failed_batches: u64,
    ) -> Self {
        Self {
            succeeded: false,
            cancelled: true,
            error_message: Some("Operation cancelled".to_string()),
            ..Self::completed(output_directory, planned_count, frames, failed_batches)
        }
    }

    /// Timestamps that produced no frame, whether through a failed batch or
    /// a silently skipped timestamp.
    pub fn missing_count(&self) -> u64 {
        self.planned_count.saturating_sub(self.extracted_count)
    }

    /// A JSON summary for machine consumers.
    pub fn to_json(&self) -> Value {
        json!({
            "succeeded": self.succeeded,
            "cancelled": self.cancelled,
            "extracted_count": self.extracted_count,
            "planned_count": self.planned_count,
            "failed_batches": self.failed_batches,
            "output_directory": self.output_directory.display().to_string(),
            "frames": self
                .frames
                .iter()
                .map(|frame| frame.display().to_string())
                .collect::<Vec<_>>(),
            "error_message": self.error_message,
        })
    }
}
