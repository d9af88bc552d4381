//! Output folder naming.
//!
//! Every extraction run writes into its own directory named after the video
//! plus the epoch-millisecond time the folder was created, e.g.
//! `Screenshots/My_Trip_1760870400123`.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    error::FrameSnapError,
    storage::{LocalStorage, Storage},
};

/// Name used when a video reference has no usable file name.
pub const FALLBACK_FOLDER_NAME: &str = "video";

/// Directory name appended to the platform documents directory by
/// [`default_output_root`].
pub const SCREENSHOTS_DIRECTORY: &str = "Screenshots";

/// The default parent directory for output folders:
/// `<documents>/Screenshots`, or `./Screenshots` when the platform has no
/// documents directory.
pub fn default_output_root() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SCREENSHOTS_DIRECTORY)
}

/// Derive a filesystem-safe folder name from a video reference.
///
/// Takes the last `/`-separated segment, drops its final extension, and
/// replaces every character outside `[A-Za-z0-9]` with `_`.
///
/// # Example
///
/// ```
/// use framesnap::sanitize_folder_name;
///
/// assert_eq!(sanitize_folder_name("file:///videos/My Trip.MOV"), "My_Trip");
/// assert_eq!(sanitize_folder_name("archive.tar.gz"), "archive_tar");
/// assert_eq!(sanitize_folder_name("clips/"), "video");
/// ```
pub fn sanitize_folder_name(video_reference: &str) -> String {
    let segment = video_reference.rsplit('/').next().unwrap_or_default();

    // A leading dot alone (".hidden") is not an extension.
    let stem = match segment.rfind('.') {
        Some(dot) if dot > 0 => &segment[..dot],
        _ => segment,
    };

    let sanitized: String = stem
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.is_empty() {
        FALLBACK_FOLDER_NAME.to_string()
    } else {
        sanitized
    }
}

/// Creates the per-run output directory.
///
/// # Example
///
/// ```no_run
/// use framesnap::OutputNamespace;
///
/// let namespace = OutputNamespace::new("/tmp/frames");
/// let folder = namespace.create_folder("holiday.mp4")?;
/// println!("writing frames to {}", folder.display());
/// # Ok::<(), framesnap::FrameSnapError>(())
/// ```
#[derive(Clone)]
pub struct OutputNamespace {
    root: PathBuf,
    storage: Arc<dyn Storage>,
}

impl Debug for OutputNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OutputNamespace")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Default for OutputNamespace {
    fn default() -> Self {
        Self::new(default_output_root())
    }
}

impl OutputNamespace {
    /// Output folders will be created under `root` on the local filesystem.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self::with_storage(root, Arc::new(LocalStorage))
    }

    /// Output folders will be created under `root` through `storage`.
    pub fn with_storage<P: Into<PathBuf>>(root: P, storage: Arc<dyn Storage>) -> Self {
        Self {
            root: root.into(),
            storage,
        }
    }

    /// The parent directory of every folder this namespace creates.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The folder a run started at `epoch_millis` would use, without
    /// creating it.
    pub fn folder_path(&self, video_reference: &str, epoch_millis: u128) -> PathBuf {
        self.root.join(format!(
            "{}_{epoch_millis}",
            sanitize_folder_name(video_reference)
        ))
    }

    /// Create a fresh output folder for `video_reference`.
    ///
    /// Two calls for the same reference produce different folders unless
    /// they land in the same millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`FrameSnapError::Storage`] if the directory cannot be
    /// created.
    pub fn create_folder(&self, video_reference: &str) -> Result<PathBuf, FrameSnapError> {
        let folder = self.folder_path(video_reference, current_epoch_millis());
        self.storage.make_directory(&folder)?;
        log::debug!("Created output folder {}", folder.display());
        Ok(folder)
    }
}

fn current_epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
