//! Error types for the `framegrab` crate.
//!
//! This module defines [`FramegrabError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the context needed to
//! explain a failure to the caller: which external program misbehaved, the
//! diagnostic text it printed, and which seek strategy was in effect.

use std::{io::Error as IoError, time::Duration};

use serde_json::Error as JsonError;
use thiserror::Error;

use crate::capture::SeekStrategy;

/// The unified error type for all `framegrab` operations.
///
/// Every public method that can fail returns `Result<T, FramegrabError>`.
/// The [`Display`](std::fmt::Display) text of a variant is what ends up in the
/// `details` field of the CLI's error envelope.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramegrabError {
    /// The video identifier was empty or whitespace only.
    #[error("Missing video id.")]
    MissingVideoId,

    /// An external program could not be started at all.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying OS error.
        #[source]
        source: IoError,
    },

    /// An external program ran longer than its configured limit and was killed.
    #[error("{program} timed out after {limit:?}")]
    Timeout {
        /// Program that was killed.
        program: String,
        /// The limit that was exceeded.
        limit: Duration,
    },

    /// The metadata extractor exited with a failure status.
    #[error("yt-dlp failed ({}): {stderr}", exit_description(.exit_code))]
    MetadataFetch {
        /// Exit code of the extractor, if it exited normally.
        exit_code: Option<i32>,
        /// Trimmed diagnostic output of the extractor.
        stderr: String,
    },

    /// The metadata extractor produced something other than a JSON object.
    #[error("yt-dlp returned invalid metadata.{}", detail_suffix(.0))]
    InvalidMetadata(String),

    /// The metadata carried a `formats` field that is not a list.
    #[error("No video formats found in yt-dlp response.")]
    NoVideoFormats,

    /// No format survived filtering: every entry was audio-only or URL-less.
    #[error("No playable video format URL found.")]
    NoPlayableFormat,

    /// The decoder failed to produce a frame with the given seek strategy.
    #[error("ffmpeg failed ({strategy}): {diagnostics}")]
    Capture {
        /// Strategy of the attempt that failed.
        strategy: SeekStrategy,
        /// Trimmed stderr of the decoder.
        diagnostics: String,
    },

    /// An I/O error occurred while talking to a child process.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// JSON (de)serialisation failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

impl FramegrabError {
    /// Whether this failure should trigger the post-input seek fallback when it
    /// occurs on the primary attempt.
    pub(crate) fn is_retryable_capture_failure(&self) -> bool {
        matches!(self, FramegrabError::Capture { .. })
    }
}

fn exit_description(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(" {detail}")
    }
}
