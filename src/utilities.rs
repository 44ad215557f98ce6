//! Internal utility functions.
//!
//! Helpers for timestamp formatting, header serialisation, diagnostic
//! cleanup, and JPEG header probing that do not belong in any single public
//! module.

use std::io::Cursor;

use image::ImageReader;

use crate::metadata::HeaderMap;

/// Format a seek offset in seconds with millisecond precision (`"12.500"`).
pub fn format_seek_timestamp(seconds: f64) -> String {
    format!("{:.3}", seconds.max(0.0))
}

/// Serialise headers into the single blob the decoder's `-headers` option
/// expects: one `Name: value` line per header, each terminated by CRLF.
///
/// Returns `None` when there are no headers to send.
pub fn header_blob(headers: &HeaderMap) -> Option<String> {
    if headers.is_empty() {
        return None;
    }
    Some(
        headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}\r\n"))
            .collect(),
    )
}

/// Decode a child's stderr lossily and trim surrounding whitespace.
pub fn trim_diagnostics(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr).trim().to_string()
}

/// Read the pixel dimensions from an encoded image's header.
///
/// Only the header is parsed; returns `None` for anything the `image` crate
/// does not recognise.
pub fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
