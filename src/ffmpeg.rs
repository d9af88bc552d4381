//! FFmpeg initialisation and log level configuration.
//!
//! FFmpeg prints its own warnings to stderr independently of the Rust
//! [`log`](https://crates.io/crates/log) facade used by this crate. Decoding
//! many timestamps from a slightly damaged file can be very noisy, so the
//! level is exposed here without requiring callers to depend on
//! `ffmpeg-next`.
//!
//! # Example
//!
//! ```no_run
//! use framesnap::FfmpegLogLevel;
//!
//! let level: FfmpegLogLevel = "error".parse()?;
//! framesnap::set_ffmpeg_log_level(level);
//! # Ok::<(), String>(())
//! ```

use std::{str::FromStr, sync::OnceLock};

use ffmpeg_next::util::log::Level;

use crate::error::FrameSnapError;

/// FFmpeg console verbosity, from silent to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unknown FFmpeg log level: {other}")),
        }
    }
}

/// Set FFmpeg's console verbosity. Does not affect `log` crate output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

/// Initialise FFmpeg once per process.
///
/// Subsequent calls return the result of the first one.
pub(crate) fn ensure_initialized() -> Result<(), FrameSnapError> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    INIT.get_or_init(|| {
        ffmpeg_next::init().map_err(|error| format!("initialisation failed: {error}"))
    })
    .clone()
    .map_err(FrameSnapError::FfmpegError)
}
