//! Batched extraction runs.
//!
//! [`FrameExtractor`] drives a [`FrameDecoder`] over a timestamp plan one
//! batch at a time, renames the files it produces into a gap-free
//! `frame_00001.png`, `frame_00002.png`, ... sequence, and reports progress.
//! A batch whose decoder call fails is logged and skipped; only setup
//! failures turn the outcome into a failure.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framesnap::{
//!     ExtractOptions, ExtractionRequest, FfmpegFrameDecoder, FrameExtractor, ProgressEvent,
//!     SamplingMode,
//! };
//!
//! let options = ExtractOptions::new()
//!     .with_output_root("/tmp/frames")
//!     .with_progress(Arc::new(|event: &ProgressEvent| println!("{event}")));
//! let extractor = FrameExtractor::new(FfmpegFrameDecoder::new()).with_options(options);
//!
//! let request = ExtractionRequest::new("input.mp4", 12.0, SamplingMode::Rate(1.0));
//! let outcome = extractor.run(&request);
//! println!("{} frames in {}", outcome.extracted_count, outcome.output_directory.display());
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    config::ExtractOptions,
    decoder::FrameDecoder,
    error::FrameSnapError,
    namespace::OutputNamespace,
    outcome::ExtractionOutcome,
    planner::{partition_batches, plan_timestamps},
    progress::ProgressTracker,
    request::ExtractionRequest,
    storage::{LocalStorage, Storage},
};

/// Extension used when a decoder returns a file without one.
const DEFAULT_FRAME_EXTENSION: &str = "png";

/// File name of the `index`-th (1-based) frame of a run.
///
/// ```
/// assert_eq!(framesnap::frame_file_name(7, "png"), "frame_00007.png");
/// ```
pub fn frame_file_name(index: u64, extension: &str) -> String {
    format!("frame_{index:05}.{extension}")
}

/// Runs extractions against an injected decoder and storage.
pub struct FrameExtractor<D> {
    decoder: D,
    storage: Arc<dyn Storage>,
    options: ExtractOptions,
}

impl<D> Debug for FrameExtractor<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameExtractor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<D: FrameDecoder> FrameExtractor<D> {
    /// An extractor writing to the local filesystem with default options.
    pub fn new(decoder: D) -> Self {
        Self::with_storage(decoder, Arc::new(LocalStorage))
    }

    /// An extractor using `storage` for every directory and file operation.
    pub fn with_storage(decoder: D, storage: Arc<dyn Storage>) -> Self {
        Self {
            decoder,
            storage,
            options: ExtractOptions::new(),
        }
    }

    /// Replace the extraction options.
    #[must_use]
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// The current options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// The decoder this extractor drives.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    #[cfg(feature = "async")]
    pub(crate) fn options_mut(&mut self) -> &mut ExtractOptions {
        &mut self.options
    }

    /// Run a complete extraction: create a fresh output folder under the
    /// configured root, plan timestamps, and extract them.
    ///
    /// When setup fails before a folder exists, the outcome's
    /// `output_directory` is the output root.
    pub fn run(&self, request: &ExtractionRequest) -> ExtractionOutcome {
        let namespace =
            OutputNamespace::with_storage(
                self.options.output_root.clone(),
                Arc::clone(&self.storage),
            );

        let setup = self
            .validate(request)
            .and_then(|()| plan_timestamps(request.duration_seconds, request.sampling))
            .and_then(|timestamps| {
                namespace
                    .create_folder(&request.video_reference)
                    .map(|folder| (folder, timestamps))
            });

        match setup {
            Ok((folder, timestamps)) => self.extract(request, &folder, &timestamps),
            Err(error) => {
                log::error!("Extraction setup failed for {}: {error}", request.video_reference);
                ExtractionOutcome::failed(namespace.root().to_path_buf(), error.to_string())
            }
        }
    }

    /// Extract `timestamps` of `request` into `output_directory`.
    ///
    /// Creates the directory if it does not exist yet, then calls the
    /// decoder once per batch, strictly in order. Progress goes to the
    /// configured callback: one `Preparing` event, then one event per batch.
    pub fn extract(
        &self,
        request: &ExtractionRequest,
        output_directory: &Path,
        timestamps: &[u64],
    ) -> ExtractionOutcome {
        let output_directory = output_directory.to_path_buf();

        if let Err(error) = self
            .validate(request)
            .and_then(|()| self.prepare_directory(&output_directory))
        {
            log::error!("Extraction setup failed for {}: {error}", request.video_reference);
            return ExtractionOutcome::failed(output_directory, error.to_string());
        }

        let planned = timestamps.len() as u64;
        let batches = partition_batches(timestamps, self.options.batch_size);
        let batch_count = batches.len();

        log::info!(
            "Extracting {planned} frames from {} into {} ({batch_count} batches)",
            request.video_reference,
            output_directory.display(),
        );

        let mut tracker =
            ProgressTracker::new(Arc::clone(&self.options.progress), planned, batch_count);
        tracker.preparing();

        let mut frames: Vec<PathBuf> = Vec::with_capacity(timestamps.len());
        let mut failed_batches = 0_u64;

        for (batch_index, batch) in batches.enumerate() {
            if self.options.is_cancelled() {
                log::info!("Extraction cancelled before batch {}/{batch_count}", batch_index + 1);
                return ExtractionOutcome::cancelled(
                    output_directory,
                    planned,
                    frames,
                    failed_batches,
                );
            }

            let batch_error = match self.decoder.extract_frames(
                &request.video_reference,
                batch,
                &output_directory,
                self.options.quality,
            ) {
                Ok(produced) => {
                    if produced.len() < batch.len() {
                        log::debug!(
                            "Batch {}/{batch_count}: decoder produced {} of {} frames",
                            batch_index + 1,
                            produced.len(),
                            batch.len(),
                        );
                    }
                    self.adopt_frames(produced, &output_directory, &mut frames);
                    None
                }
                Err(error) => {
                    log::warn!("Batch {}/{batch_count} failed: {error}", batch_index + 1);
                    failed_batches += 1;
                    Some(error.to_string())
                }
            };

            tracker.batch_finished(frames.len() as u64, batch_error);
        }

        log::info!(
            "Extracted {} / {planned} frames into {}",
            frames.len(),
            output_directory.display(),
        );

        ExtractionOutcome::completed(output_directory, planned, frames, failed_batches)
    }

    fn validate(&self, request: &ExtractionRequest) -> Result<(), FrameSnapError> {
        request.validate()?;
        self.options.validate()
    }

    fn prepare_directory(&self, output_directory: &Path) -> Result<(), FrameSnapError> {
        if self.storage.exists(output_directory) {
            return Ok(());
        }
        self.storage.make_directory(output_directory)
    }

    /// Move decoder output into the run's numbered sequence.
    ///
    /// Numbering continues from `frames.len()`; a file that cannot be moved
    /// does not consume a number and is left where the decoder wrote it.
    fn adopt_frames(
        &self,
        produced: Vec<PathBuf>,
        output_directory: &Path,
        frames: &mut Vec<PathBuf>,
    ) {
        for source in produced {
            let extension = source
                .extension()
                .and_then(|extension| extension.to_str())
                .unwrap_or(DEFAULT_FRAME_EXTENSION);
            let destination =
                output_directory.join(frame_file_name(frames.len() as u64 + 1, extension));

            if source != destination {
                if let Err(error) = self.storage.move_file(&source, &destination) {
                    log::warn!("Dropping frame {}: {error}", source.display());
                    continue;
                }
            }

            frames.push(destination);
        }
    }
}
