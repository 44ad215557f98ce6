//! Single-frame capture with a seek fallback.
//!
//! A [`CaptureRequest`] describes which stream to open, where to seek, and
//! which HTTP headers to send. [`capture_frame`] hands it to a
//! [`FrameDecoder`] with [`SeekStrategy::PreInput`] first. When that attempt
//! is rejected (non-zero exit or empty output, including a timed-out primary
//! attempt) it tries exactly once more with [`SeekStrategy::PostInput`].
//!
//! # Example
//!
//! ```no_run
//! use framegrab::{CaptureRequest, Ffmpeg, FramegrabError, capture_frame};
//!
//! # async fn example() -> Result<(), FramegrabError> {
//! let decoder = Ffmpeg::new("ffmpeg");
//! let request = CaptureRequest::new("https://example.com/video.mp4", 12.5);
//! let jpeg = capture_frame(&decoder, &request).await?;
//! println!("captured {} bytes", jpeg.len());
//! # Ok(())
//! # }
//! ```

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    process::Output,
};

use async_trait::async_trait;

use crate::{
    error::FramegrabError,
    metadata::HeaderMap,
    utilities::{format_seek_timestamp, trim_diagnostics},
};

/// Where the seek instruction sits relative to the input in the decoder
/// invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekStrategy {
    /// Seek before opening the input. Fast, demuxer-level seeking.
    PreInput,
    /// Seek after opening the input. Decodes and discards up to the target.
    PostInput,
}

impl SeekStrategy {
    /// Strategy to try after this one fails, if any.
    pub fn fallback(self) -> Option<SeekStrategy> {
        match self {
            SeekStrategy::PreInput => Some(SeekStrategy::PostInput),
            SeekStrategy::PostInput => None,
        }
    }
}

impl Display for SeekStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SeekStrategy::PreInput => write!(f, "pre-input seek"),
            SeekStrategy::PostInput => write!(f, "post-input seek"),
        }
    }
}

/// Everything the decoder needs to grab one frame from a remote stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Stream URL handed to the decoder as its input.
    pub input_url: String,
    /// Target offset in seconds, never negative.
    pub timestamp_seconds: f64,
    /// HTTP headers sent when the decoder opens the stream.
    pub headers: HeaderMap,
}

impl CaptureRequest {
    /// Create a request without headers. Negative (and NaN) timestamps are
    /// clamped to `0.0`.
    pub fn new(input_url: impl Into<String>, timestamp_seconds: f64) -> Self {
        Self {
            input_url: input_url.into(),
            timestamp_seconds: timestamp_seconds.max(0.0),
            headers: HeaderMap::new(),
        }
    }

    /// Attach the HTTP headers to send with the stream request.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The seek position as passed to the decoder, with millisecond precision.
    pub fn seek_position(&self) -> String {
        format_seek_timestamp(self.timestamp_seconds)
    }
}

/// Raw outcome of one decoder run.
///
/// Interpreting it (success vs. rejection) is left to [`capture_frame`] so
/// fake decoders only need to describe what the process did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutput {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Bytes written to standard output (the encoded image).
    pub stdout: Vec<u8>,
    /// Bytes written to standard error (diagnostics).
    pub stderr: Vec<u8>,
}

impl DecodeOutput {
    /// Turn the raw outcome into frame bytes, or a [`FramegrabError::Capture`]
    /// naming `strategy` when the decoder failed or wrote nothing.
    pub fn into_frame(self, strategy: SeekStrategy) -> Result<Vec<u8>, FramegrabError> {
        if !self.success || self.stdout.is_empty() {
            return Err(FramegrabError::Capture {
                strategy,
                diagnostics: trim_diagnostics(&self.stderr),
            });
        }
        Ok(self.stdout)
    }
}

impl From<Output> for DecodeOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// A capability that can run the external decoder once.
///
/// The production implementation is [`Ffmpeg`](crate::Ffmpeg); tests swap in
/// fakes that return canned [`DecodeOutput`] values.
#[async_trait]
pub trait FrameDecoder {
    /// Run the decoder for `request` using `strategy`.
    ///
    /// Returning `Err` means the decoder could not be run at all (missing
    /// binary, timeout). A decoder that ran and failed is reported through an
    /// unsuccessful [`DecodeOutput`].
    async fn decode(
        &self,
        request: &CaptureRequest,
        strategy: SeekStrategy,
    ) -> Result<DecodeOutput, FramegrabError>;
}

/// Capture one JPEG frame, falling back from pre-input to post-input seek.
///
/// # Errors
///
/// Returns [`FramegrabError::Capture`] for the post-input attempt when both
/// strategies fail, or the error of the primary attempt when it failed for a
/// reason a different seek position cannot fix (e.g. [`FramegrabError::Spawn`]).
pub async fn capture_frame<D>(
    decoder: &D,
    request: &CaptureRequest,
) -> Result<Vec<u8>, FramegrabError>
where
    D: FrameDecoder + ?Sized,
{
    let mut strategy = SeekStrategy::PreInput;
    loop {
        match attempt(decoder, request, strategy).await {
            Ok(frame) => return Ok(frame),
            Err(error) if error.is_retryable_capture_failure() => match strategy.fallback() {
                Some(next) => {
                    log::warn!("{error}; retrying with {next}");
                    strategy = next;
                }
                None => return Err(error),
            },
            Err(error) => return Err(error),
        }
    }
}

async fn attempt<D>(
    decoder: &D,
    request: &CaptureRequest,
    strategy: SeekStrategy,
) -> Result<Vec<u8>, FramegrabError>
where
    D: FrameDecoder + ?Sized,
{
    log::debug!(
        "Capturing frame at {}s ({strategy})",
        request.seek_position()
    );
    let output = match decoder.decode(request, strategy).await {
        Ok(output) => output,
        // A hung seek is a strategy failure, not a reason to give up.
        Err(timeout @ FramegrabError::Timeout { .. }) => {
            return Err(FramegrabError::Capture {
                strategy,
                diagnostics: timeout.to_string(),
            });
        }
        Err(error) => return Err(error),
    };
    output.into_frame(strategy)
}
