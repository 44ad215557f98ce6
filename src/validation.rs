//! Input validation.
//!
//! The two user inputs, a video id and a timestamp, are normalised here
//! before anything external is touched: the id is trimmed and must not be
//! empty, the timestamp is clamped to zero.

use crate::error::FramegrabError;

/// Prefix of a canonical YouTube watch URL.
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Trim a video id, rejecting one that is empty afterwards.
///
/// # Errors
///
/// Returns [`FramegrabError::MissingVideoId`] for empty or whitespace-only
/// input.
pub fn normalize_video_id(raw: &str) -> Result<&str, FramegrabError> {
    let video_id = raw.trim();
    if video_id.is_empty() {
        return Err(FramegrabError::MissingVideoId);
    }
    Ok(video_id)
}

/// Clamp a requested offset to `0.0` or later. `NaN` also becomes `0.0`.
pub fn clamp_timestamp(seconds: f64) -> f64 {
    seconds.max(0.0)
}

/// Canonical watch URL for a (normalised) video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{video_id}")
}
