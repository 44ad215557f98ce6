//! JSON envelopes written by the command-line tool.
//!
//! A successful run prints one [`FramePayload`] on stdout; a failed run
//! prints one [`ErrorPayload`] on stderr. Both are rendered by
//! [`to_json_line`] on a single ASCII line with `", "` and `": "` separators:
//!
//! ```text
//! {"mimeType": "image/jpeg", "imageBytes": "/9j/4AAQ...", "width": 1280, "height": 720}
//! {"error": "Failed to extract frame from YouTube.", "details": "No playable video format URL found."}
//! ```

use std::io;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::{error::FramegrabError, utilities::jpeg_dimensions};

/// MIME type of every captured frame.
pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// The captured frame, base64-encoded, with its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePayload {
    /// Always [`JPEG_MIME_TYPE`].
    pub mime_type: String,
    /// Standard base64 (with padding) of the JPEG bytes.
    pub image_bytes: String,
    /// Width in pixels, `null` when unknown.
    pub width: Option<u32>,
    /// Height in pixels, `null` when unknown.
    pub height: Option<u32>,
}

impl FramePayload {
    /// Build a payload from JPEG bytes and the dimensions reported for the
    /// selected format.
    ///
    /// When either dimension is unknown both are read from the JPEG header
    /// instead, if it can be parsed.
    pub fn from_jpeg(jpeg: &[u8], width: Option<u32>, height: Option<u32>) -> Self {
        let (width, height) = match (width, height) {
            (Some(width), Some(height)) => (Some(width), Some(height)),
            _ => match jpeg_dimensions(jpeg) {
                Some((probed_width, probed_height)) => {
                    log::debug!("Using JPEG header dimensions {probed_width}x{probed_height}");
                    (Some(probed_width), Some(probed_height))
                }
                None => (width, height),
            },
        };

        Self {
            mime_type: JPEG_MIME_TYPE.to_string(),
            image_bytes: STANDARD.encode(jpeg),
            width,
            height,
        }
    }

    /// Decode [`image_bytes`](FramePayload::image_bytes) back into raw JPEG
    /// bytes.
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.image_bytes)
    }
}

/// The failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    /// Short human-readable message.
    pub error: String,
    /// Underlying diagnostic, omitted when there is none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorPayload {
    /// Create an envelope without details.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Attach details. Empty details are dropped.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = (!details.is_empty()).then_some(details);
        self
    }
}

/// Render `value` as a single JSON line with spaced separators.
///
/// # Errors
///
/// Returns [`FramegrabError::JsonError`] if `value` fails to serialise.
pub fn to_json_line<T: Serialize + ?Sized>(value: &T) -> Result<String, FramegrabError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, SpacedFormatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Compact output, but with a space after `,` and `:`. Non-ASCII characters
/// are written as `\uXXXX` escapes (UTF-16 surrogate pairs above U+FFFF).
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, character) in fragment.char_indices() {
            if character.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in character.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + character.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
