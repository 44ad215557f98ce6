//! Video metadata from yt-dlp.
//!
//! The extractor's JSON is loosely shaped: fields come and go, and their
//! types are not guaranteed. [`VideoInfo::from_value`] validates it once at
//! the boundary and produces typed [`FormatRecord`]s plus the global HTTP
//! headers, so nothing downstream touches raw JSON.
//!
//! The extractor itself is a [`MetadataSource`]; [`YtDlp`] is the production
//! implementation.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::{
    configuration::GrabConfig,
    error::FramegrabError,
    format::FormatRecord,
    process::run_captured,
    utilities::trim_diagnostics,
};

/// HTTP header name → value, ordered by name.
pub type HeaderMap = BTreeMap<String, String>;

/// Validated subset of the extractor's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfo {
    /// Every format record that could be parsed, in extractor order.
    pub formats: Vec<FormatRecord>,
    /// Headers that apply to every format.
    pub http_headers: HeaderMap,
}

impl VideoInfo {
    /// Validate raw extractor output.
    ///
    /// A missing or `null` `formats` field yields an empty list. Entries that
    /// are not objects are skipped; a field of an unexpected type is read as
    /// unknown without dropping its entry.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::InvalidMetadata`] if `value` is not a JSON
    /// object, or [`FramegrabError::NoVideoFormats`] if `formats` is present
    /// but not an array.
    pub fn from_value(value: Value) -> Result<Self, FramegrabError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(FramegrabError::InvalidMetadata(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        let formats = match object.remove("formats") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => parse_formats(entries),
            Some(_) => return Err(FramegrabError::NoVideoFormats),
        };

        let http_headers = object
            .get("http_headers")
            .map(headers_from_value)
            .unwrap_or_default();

        log::debug!(
            "Metadata lists {} formats and {} global headers",
            formats.len(),
            http_headers.len()
        );

        Ok(Self {
            formats,
            http_headers,
        })
    }

    /// Headers to send when opening `format`: the global headers, extended
    /// and overridden by the format's own.
    pub fn headers_for(&self, format: &FormatRecord) -> HeaderMap {
        merge_headers(&self.http_headers, &format.http_headers)
    }
}

/// Merge two header maps. Entries of `per_format` win on identical names.
pub fn merge_headers(global: &HeaderMap, per_format: &HeaderMap) -> HeaderMap {
    let mut merged = global.clone();
    merged.extend(
        per_format
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    merged
}

/// Collect the string-valued entries of a JSON object. Anything else yields
/// an empty map.
pub(crate) fn headers_from_value(value: &Value) -> HeaderMap {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(name, value)| {
                    value.as_str().map(|value| (name.clone(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_formats(entries: Vec<Value>) -> Vec<FormatRecord> {
    let total = entries.len();
    let formats: Vec<FormatRecord> = entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if formats.len() < total {
        log::debug!("Skipped {} non-object format entries", total - formats.len());
    }
    formats
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A capability that turns a watch URL into raw video metadata.
#[async_trait]
pub trait MetadataSource {
    /// Fetch metadata for `watch_url` without downloading any media.
    async fn fetch(&self, watch_url: &str) -> Result<Value, FramegrabError>;
}

/// Metadata source backed by the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl YtDlp {
    /// Create an extractor that runs `binary` with no time limit.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Create an extractor from the binary path and timeout in `config`.
    pub fn from_config(config: &GrabConfig) -> Self {
        Self {
            binary: config.ytdlp_path.clone(),
            timeout: config.metadata_timeout,
        }
    }

    /// Kill the extractor if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the argument list (without the program): quiet, no warnings,
    /// metadata only.
    pub fn arguments(&self, watch_url: &str) -> Vec<String> {
        [
            "--dump-single-json",
            "--no-warnings",
            "--quiet",
            "--skip-download",
        ]
        .into_iter()
        .map(String::from)
        .chain(std::iter::once(watch_url.to_string()))
        .collect()
    }
}

#[async_trait]
impl MetadataSource for YtDlp {
    async fn fetch(&self, watch_url: &str) -> Result<Value, FramegrabError> {
        log::debug!("Fetching metadata for {watch_url}");

        let mut command = Command::new(&self.binary);
        command.args(self.arguments(watch_url));
        let output = run_captured(command, self.timeout).await?;

        if !output.status.success() {
            return Err(FramegrabError::MetadataFetch {
                exit_code: output.status.code(),
                stderr: trim_diagnostics(&output.stderr),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|error| FramegrabError::InvalidMetadata(error.to_string()))
    }
}
