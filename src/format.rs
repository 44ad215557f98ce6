//! Format selection.
//!
//! yt-dlp describes every rendition of a video as a format record. Only one
//! of them is handed to the decoder: [`select_best_format`] drops audio-only
//! and URL-less records and ranks the rest by [`SelectionScore`], which
//! prefers, in order:
//!
//! 1. an MP4 container,
//! 2. plain HTTP(S) delivery over segmented/adaptive protocols,
//! 3. higher resolution, capped at [`HEIGHT_CAP`] pixels,
//! 4. higher bitrate.
//!
//! # Example
//!
//! ```
//! use framegrab::{FormatRecord, select_best_format};
//!
//! let formats = vec![
//!     FormatRecord::new("https://cdn.example.com/720.mp4")
//!         .with_extension("mp4")
//!         .with_protocol("https")
//!         .with_height(720),
//!     FormatRecord::new("https://cdn.example.com/1080.webm")
//!         .with_extension("webm")
//!         .with_protocol("https")
//!         .with_height(1080),
//! ];
//!
//! let best = select_best_format(&formats)?;
//! assert_eq!(best.height, Some(720));
//! # Ok::<(), framegrab::FramegrabError>(())
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    error::FramegrabError,
    metadata::{HeaderMap, headers_from_value},
};

/// Heights above this are treated as equal when ranking formats.
pub const HEIGHT_CAP: u32 = 1080;

/// Codec value yt-dlp uses for "this format has no video track".
pub const NO_CODEC: &str = "none";

/// One candidate stream as described by the metadata extractor.
///
/// Field names follow yt-dlp's JSON (`vcodec`, `ext`, `tbr`, ...). Missing,
/// `null`, or unusable fields are `None`; a mistyped field never drops the
/// record. Numbers may also arrive as floats or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatRecord {
    /// yt-dlp's identifier for the format (e.g. `"137"`), used for logging.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub format_id: Option<String>,
    /// Direct stream URL.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub url: Option<String>,
    /// Video codec, or `"none"` for audio-only formats.
    #[serde(default, rename = "vcodec", deserialize_with = "deserialize_text")]
    pub video_codec: Option<String>,
    /// Container extension (e.g. `"mp4"`, `"webm"`).
    #[serde(default, rename = "ext", deserialize_with = "deserialize_text")]
    pub extension: Option<String>,
    /// Delivery protocol (e.g. `"https"`, `"m3u8_native"`).
    #[serde(default, deserialize_with = "deserialize_text")]
    pub protocol: Option<String>,
    /// Frame width in pixels, if known.
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub width: Option<u32>,
    /// Frame height in pixels, if known.
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub height: Option<u32>,
    /// Total bitrate in kbit/s, if known.
    #[serde(default, rename = "tbr", deserialize_with = "deserialize_bitrate")]
    pub bitrate: Option<f64>,
    /// Headers the stream URL must be requested with.
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub http_headers: HeaderMap,
}

impl FormatRecord {
    /// Create a record with only a stream URL set.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the format identifier.
    #[must_use]
    pub fn with_format_id(mut self, format_id: impl Into<String>) -> Self {
        self.format_id = Some(format_id.into());
        self
    }

    /// Set the video codec.
    #[must_use]
    pub fn with_video_codec(mut self, codec: impl Into<String>) -> Self {
        self.video_codec = Some(codec.into());
        self
    }

    /// Set the container extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Set the delivery protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the frame width.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the frame height.
    #[must_use]
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the total bitrate in kbit/s.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: f64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Set the per-format HTTP headers.
    #[must_use]
    pub fn with_http_headers(mut self, headers: HeaderMap) -> Self {
        self.http_headers = headers;
        self
    }

    /// The stream URL, if present and non-empty.
    pub fn stream_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Whether yt-dlp marked this format as having no video track.
    pub fn is_audio_only(&self) -> bool {
        self.video_codec.as_deref() == Some(NO_CODEC)
    }

    /// Whether this record can be handed to the decoder at all.
    pub fn is_candidate(&self) -> bool {
        self.stream_url().is_some() && !self.is_audio_only()
    }

    /// Ranking key for this record.
    pub fn score(&self) -> SelectionScore {
        SelectionScore {
            is_mp4: self.extension.as_deref() == Some("mp4"),
            is_http: self
                .protocol
                .as_deref()
                .is_some_and(|protocol| protocol.starts_with("http")),
            capped_height: self.height.unwrap_or(0).min(HEIGHT_CAP),
            bitrate: self.bitrate.unwrap_or(0.0),
        }
    }

    /// Short human-readable label for log messages.
    pub(crate) fn label(&self) -> String {
        format!(
            "{} ({}, {}, {}p)",
            self.format_id.as_deref().unwrap_or("?"),
            self.extension.as_deref().unwrap_or("?"),
            self.protocol.as_deref().unwrap_or("?"),
            self.height.unwrap_or(0),
        )
    }
}

/// Ranking key derived from a [`FormatRecord`].
///
/// Compared lexicographically, field by field, in declaration order. A
/// greater score is a better format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionScore {
    /// The container is MP4.
    pub is_mp4: bool,
    /// The protocol starts with `http` (covers `https`).
    pub is_http: bool,
    /// Height clamped to [`HEIGHT_CAP`]; `0` when unknown.
    pub capped_height: u32,
    /// Total bitrate; `0.0` when unknown.
    pub bitrate: f64,
}

impl SelectionScore {
    /// Total order over scores. Bitrates are compared with
    /// [`f64::total_cmp`], so the order is defined even for odd inputs.
    pub fn rank(&self, other: &Self) -> Ordering {
        (self.is_mp4, self.is_http, self.capped_height)
            .cmp(&(other.is_mp4, other.is_http, other.capped_height))
            .then_with(|| self.bitrate.total_cmp(&other.bitrate))
    }
}

/// Pick the best playable format.
///
/// Among equally scored candidates the one listed first wins, so the result
/// is stable for a given input.
///
/// # Errors
///
/// Returns [`FramegrabError::NoPlayableFormat`] when no record has a
/// non-empty URL and a video codec other than `"none"`.
pub fn select_best_format(formats: &[FormatRecord]) -> Result<&FormatRecord, FramegrabError> {
    let best = formats
        .iter()
        .filter(|format| format.is_candidate())
        .map(|format| (format.score(), format))
        .reduce(|best, candidate| {
            if candidate.0.rank(&best.0) == Ordering::Greater {
                candidate
            } else {
                best
            }
        });

    match best {
        Some((score, format)) => {
            log::debug!("Selected format {} with score {:?}", format.label(), score);
            Ok(format)
        }
        None => {
            log::debug!("None of {} formats is playable", formats.len());
            Err(FramegrabError::NoPlayableFormat)
        }
    }
}

fn deserialize_headers<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(headers_from_value).unwrap_or_default())
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        _ => None,
    })
}

fn deserialize_dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(lenient_number)
        .filter(|pixels| (0.0..=f64::from(u32::MAX)).contains(pixels))
        .map(|pixels| pixels.trunc() as u32))
}

fn deserialize_bitrate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_number))
}

/// A finite number from a JSON number or a numeric string.
fn lenient_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_only_is_not_a_candidate() {
        let format = FormatRecord::new("https://example.com/a.m4a").with_video_codec("none");
        assert!(format.is_audio_only());
        assert!(!format.is_candidate());
    }

    #[test]
    fn empty_url_is_not_a_candidate() {
        assert!(!FormatRecord::new("").is_candidate());
        assert!(!FormatRecord::default().is_candidate());
    }

    #[test]
    fn unknown_fields_score_as_zero() {
        let score = FormatRecord::new("https://example.com/v").score();
        assert_eq!(
            score,
            SelectionScore {
                is_mp4: false,
                is_http: false,
                capped_height: 0,
                bitrate: 0.0,
            }
        );
    }

    #[test]
    fn height_is_capped() {
        let score = FormatRecord::new("u").with_height(2160).score();
        assert_eq!(score.capped_height, HEIGHT_CAP);
    }

    #[test]
    fn https_counts_as_http() {
        assert!(FormatRecord::new("u").with_protocol("https").score().is_http);
        assert!(!FormatRecord::new("u").with_protocol("m3u8_native").score().is_http);
    }

    #[test]
    fn rank_is_lexicographic() {
        let mp4_low = FormatRecord::new("u")
            .with_extension("mp4")
            .with_height(360)
            .score();
        let webm_high = FormatRecord::new("u")
            .with_extension("webm")
            .with_protocol("https")
            .with_height(1080)
            .with_bitrate(9000.0)
            .score();
        assert_eq!(mp4_low.rank(&webm_high), Ordering::Greater);
    }

    #[test]
    fn deserializes_ytdlp_fields() {
        let format: FormatRecord = serde_json::from_value(serde_json::json!({
            "format_id": "22",
            "url": "https://example.com/22.mp4",
            "vcodec": "avc1.64001F",
            "ext": "mp4",
            "protocol": "https",
            "width": 1280,
            "height": 720,
            "tbr": 2500,
            "http_headers": {"User-Agent": "Mozilla/5.0", "X-Number": 3},
        }))
        .unwrap();

        assert_eq!(format.format_id.as_deref(), Some("22"));
        assert_eq!(format.video_codec.as_deref(), Some("avc1.64001F"));
        assert_eq!(format.bitrate, Some(2500.0));
        assert_eq!(format.width, Some(1280));
        assert_eq!(format.http_headers.len(), 1);
        assert_eq!(format.http_headers["User-Agent"], "Mozilla/5.0");
    }

    #[test]
    fn mistyped_numbers_are_coerced() {
        let format: FormatRecord = serde_json::from_value(serde_json::json!({
            "url": "https://example.com/v",
            "width": 1280.0,
            "height": "720",
            "tbr": "2500.5",
        }))
        .unwrap();

        assert_eq!(format.width, Some(1280));
        assert_eq!(format.height, Some(720));
        assert_eq!(format.bitrate, Some(2500.5));
    }

    #[test]
    fn unusable_fields_become_unknown() {
        let format: FormatRecord = serde_json::from_value(serde_json::json!({
            "format_id": 137,
            "url": "https://example.com/v",
            "ext": ["mp4"],
            "height": "tall",
            "width": -640,
            "tbr": {"kbps": 900},
        }))
        .unwrap();

        assert_eq!(format.format_id, None);
        assert_eq!(format.extension, None);
        assert_eq!(format.height, None);
        assert_eq!(format.width, None);
        assert_eq!(format.bitrate, None);
        assert!(format.is_candidate());
    }

    #[test]
    fn deserializes_nulls_as_unknown() {
        let format: FormatRecord = serde_json::from_value(serde_json::json!({
            "url": "https://example.com/v",
            "height": null,
            "tbr": null,
            "http_headers": null,
        }))
        .unwrap();

        assert_eq!(format.height, None);
        assert_eq!(format.bitrate, None);
        assert!(format.http_headers.is_empty());
    }
}
