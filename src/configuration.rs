//! Grab configuration.
//!
//! [`GrabConfig`] is a builder that carries the operational settings of one
//! invocation (where the external programs live, how long each may run, and
//! how chatty FFmpeg should be) without threading them through every
//! function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framegrab::{FfmpegLogLevel, GrabConfig};
//!
//! let config = GrabConfig::new()
//!     .with_ffmpeg_path("/usr/local/bin/ffmpeg")
//!     .with_decoder_timeout(Some(Duration::from_secs(30)))
//!     .with_ffmpeg_log_level(FfmpegLogLevel::Warning);
//! ```

use std::{path::PathBuf, time::Duration};

use crate::ffmpeg::FfmpegLogLevel;

/// Default limit for a single decoder attempt.
pub const DEFAULT_DECODER_TIMEOUT: Duration = Duration::from_secs(60);

/// Default limit for the metadata extractor.
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for a frame grab.
///
/// All fields have sensible defaults: both binaries are looked up on `PATH`,
/// each decoder attempt may run for a minute and the extractor for two.
#[derive(Debug, Clone, PartialEq)]
pub struct GrabConfig {
    /// Path to (or name of) the `ffmpeg` executable.
    pub ffmpeg_path: PathBuf,
    /// Path to (or name of) the `yt-dlp` executable.
    pub ytdlp_path: PathBuf,
    /// Limit for each decoder attempt. `None` waits indefinitely.
    pub decoder_timeout: Option<Duration>,
    /// Limit for the metadata fetch. `None` waits indefinitely.
    pub metadata_timeout: Option<Duration>,
    /// Value passed to FFmpeg's `-v`.
    pub ffmpeg_log_level: FfmpegLogLevel,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GrabConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ytdlp_path: PathBuf::from("yt-dlp"),
            decoder_timeout: Some(DEFAULT_DECODER_TIMEOUT),
            metadata_timeout: Some(DEFAULT_METADATA_TIMEOUT),
            ffmpeg_log_level: FfmpegLogLevel::default(),
        }
    }

    /// Use a specific `ffmpeg` binary.
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Use a specific `yt-dlp` binary.
    #[must_use]
    pub fn with_ytdlp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ytdlp_path = path.into();
        self
    }

    /// Limit each decoder attempt. A zero duration is treated as `None`.
    #[must_use]
    pub fn with_decoder_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.decoder_timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    /// Limit the metadata fetch. A zero duration is treated as `None`.
    #[must_use]
    pub fn with_metadata_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.metadata_timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    /// Set FFmpeg's own log level.
    #[must_use]
    pub fn with_ffmpeg_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.ffmpeg_log_level = level;
        self
    }
}
