//! Filesystem access used by the extraction pipeline.
//!
//! The pipeline never touches `std::fs` directly; it goes through the
//! [`Storage`] trait so it can run against an in-memory fake in tests.
//! [`LocalStorage`] is the real implementation.

use std::{fs, path::Path};

use crate::error::FrameSnapError;

/// Directory and file operations consumed by the extraction pipeline.
///
/// Implementations must be [`Send`] and [`Sync`] so an extractor can be moved
/// onto a background thread.
pub trait Storage: Send + Sync {
    /// Returns `true` if something exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents.
    fn make_directory(&self, path: &Path) -> Result<(), FrameSnapError>;

    /// Move a file from `source` to `destination`, replacing any file
    /// already at `destination`.
    fn move_file(&self, source: &Path, destination: &Path) -> Result<(), FrameSnapError>;
}

/// [`Storage`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn make_directory(&self, path: &Path) -> Result<(), FrameSnapError> {
        fs::create_dir_all(path).map_err(|error| FrameSnapError::Storage {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })
    }

    fn move_file(&self, source: &Path, destination: &Path) -> Result<(), FrameSnapError> {
        // rename is atomic on the same filesystem, which is always the case
        // for frames moved within one output directory.
        fs::rename(source, destination).map_err(|error| FrameSnapError::Storage {
            path: source.to_path_buf(),
            reason: format!("cannot move to {}: {error}", destination.display()),
        })
    }
}
