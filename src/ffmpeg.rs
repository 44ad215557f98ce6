//! The FFmpeg command-line decoder.
//!
//! [`Ffmpeg`] implements [`FrameDecoder`] by spawning the `ffmpeg` binary
//! once per attempt. The invocation seeks, opens the stream (optionally with
//! extra HTTP headers), and writes exactly one MJPEG-encoded frame to its
//! standard output:
//!
//! ```text
//! ffmpeg -v error [-ss T] [-headers BLOB] -i URL [-ss T] -frames:v 1 -f image2 -vcodec mjpeg -
//! ```
//!
//! The `-ss` before `-i` is used for [`SeekStrategy::PreInput`], the one
//! after for [`SeekStrategy::PostInput`].
//!
//! # Note
//!
//! [`FfmpegLogLevel`] controls what **FFmpeg itself** prints to stderr, and
//! therefore how much diagnostic text ends up in a capture error. It does not
//! affect the Rust-side messages emitted via the `log` crate.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    capture::{CaptureRequest, DecodeOutput, FrameDecoder, SeekStrategy},
    configuration::GrabConfig,
    error::FramegrabError,
    process::run_captured,
    utilities::header_blob,
};

/// FFmpeg log verbosity level, passed as the value of `-v`.
///
/// # Ordering (most verbose → most quiet)
///
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only log when the process is about to abort.
    Panic,
    /// Only log unrecoverable errors.
    Fatal,
    /// Log recoverable errors. This is the default.
    #[default]
    Error,
    /// Log warnings.
    Warning,
    /// Log informational messages.
    Info,
    /// Log verbose informational messages.
    Verbose,
    /// Log debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    /// The name FFmpeg accepts for `-v`.
    pub fn as_str(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }
}

impl Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unsupported ffmpeg log level: {other}")),
        }
    }
}

/// Decoder capability backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
    log_level: FfmpegLogLevel,
    timeout: Option<Duration>,
}

impl Ffmpeg {
    /// Create a decoder that runs `binary` with no time limit.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            log_level: FfmpegLogLevel::default(),
            timeout: None,
        }
    }

    /// Create a decoder from the binary path, log level, and per-attempt
    /// timeout in `config`.
    pub fn from_config(config: &GrabConfig) -> Self {
        Self {
            binary: config.ffmpeg_path.clone(),
            log_level: config.ffmpeg_log_level,
            timeout: config.decoder_timeout,
        }
    }

    /// Set the `-v` level.
    #[must_use]
    pub fn with_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Kill an attempt that runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the argument list (without the program) for one attempt.
    pub fn arguments(&self, request: &CaptureRequest, strategy: SeekStrategy) -> Vec<String> {
        let seek_position = request.seek_position();
        let mut arguments = vec!["-v".to_string(), self.log_level.as_str().to_string()];

        if strategy == SeekStrategy::PreInput {
            arguments.push("-ss".to_string());
            arguments.push(seek_position.clone());
        }
        if let Some(blob) = header_blob(&request.headers) {
            arguments.push("-headers".to_string());
            arguments.push(blob);
        }
        arguments.push("-i".to_string());
        arguments.push(request.input_url.clone());
        if strategy == SeekStrategy::PostInput {
            arguments.push("-ss".to_string());
            arguments.push(seek_position);
        }

        arguments.extend(
            ["-frames:v", "1", "-f", "image2", "-vcodec", "mjpeg", "-"]
                .into_iter()
                .map(String::from),
        );
        arguments
    }

    fn command(&self, request: &CaptureRequest, strategy: SeekStrategy) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(self.arguments(request, strategy));
        command
    }
}

#[async_trait]
impl FrameDecoder for Ffmpeg {
    async fn decode(
        &self,
        request: &CaptureRequest,
        strategy: SeekStrategy,
    ) -> Result<DecodeOutput, FramegrabError> {
        let output = run_captured(self.command(request, strategy), self.timeout).await?;
        Ok(DecodeOutput::from(output))
    }
}
