//! Metadata boundary integration tests.

use framegrab::{FramegrabError, HeaderMap, VideoInfo, merge_headers};
use serde_json::json;

fn headers(entries: &[(&str, &str)]) -> HeaderMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[test]
fn parses_typical_ytdlp_output() {
    let info = VideoInfo::from_value(json!({
        "id": "abc123",
        "title": "Sample",
        "duration": 212,
        "http_headers": {"User-Agent": "Mozilla/5.0", "Accept-Language": "en-us"},
        "formats": [
            {"format_id": "140", "url": "https://a/audio", "vcodec": "none", "ext": "m4a"},
            {"format_id": "22", "url": "https://a/720", "vcodec": "avc1", "ext": "mp4",
             "protocol": "https", "width": 1280, "height": 720, "tbr": 1500.5},
        ],
    }))
    .expect("valid metadata");

    assert_eq!(info.formats.len(), 2);
    assert_eq!(info.formats[1].format_id.as_deref(), Some("22"));
    assert_eq!(info.formats[1].bitrate, Some(1500.5));
    assert_eq!(info.http_headers.len(), 2);
}

#[test]
fn scalar_metadata_is_invalid() {
    for value in [json!("text"), json!(42), json!(null), json!(true)] {
        let error = VideoInfo::from_value(value).unwrap_err();
        assert!(matches!(error, FramegrabError::InvalidMetadata(_)));
        assert!(
            error
                .to_string()
                .starts_with("yt-dlp returned invalid metadata.")
        );
    }
}

#[test]
fn formats_must_be_a_list() {
    for formats in [json!("22"), json!(5), json!({"22": {}})] {
        let error = VideoInfo::from_value(json!({ "formats": formats })).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No video formats found in yt-dlp response."
        );
    }
}

#[test]
fn empty_formats_parse_to_empty_list() {
    let info = VideoInfo::from_value(json!({"formats": []})).unwrap();
    assert!(info.formats.is_empty());
    assert!(info.http_headers.is_empty());
}

#[test]
fn malformed_global_headers_are_ignored() {
    let info = VideoInfo::from_value(json!({
        "http_headers": ["User-Agent", "x"],
        "formats": [],
    }))
    .unwrap();
    assert!(info.http_headers.is_empty());
}

#[test]
fn merge_keeps_both_sides_and_prefers_format() {
    let global = headers(&[("User-Agent", "global"), ("Cookie", "a=1")]);
    let per_format = headers(&[("User-Agent", "format"), ("Range", "bytes=0-")]);

    let merged = merge_headers(&global, &per_format);
    assert_eq!(
        merged,
        headers(&[
            ("Cookie", "a=1"),
            ("Range", "bytes=0-"),
            ("User-Agent", "format"),
        ])
    );
}

#[test]
fn merge_with_empty_sides() {
    let global = headers(&[("Accept", "*/*")]);
    assert_eq!(merge_headers(&global, &HeaderMap::new()), global);
    assert_eq!(merge_headers(&HeaderMap::new(), &global), global);
    assert!(merge_headers(&HeaderMap::new(), &HeaderMap::new()).is_empty());
}

#[test]
fn mistyped_numeric_fields_keep_the_record() {
    let info = VideoInfo::from_value(json!({
        "formats": [
            {"url": "https://a/720", "vcodec": "avc1", "ext": "mp4",
             "width": 1280.0, "height": "720", "tbr": "1500"},
            {"url": "https://a/odd", "vcodec": "avc1", "height": true, "tbr": "fast"},
        ],
    }))
    .unwrap();

    assert_eq!(info.formats.len(), 2);
    assert_eq!(info.formats[0].width, Some(1280));
    assert_eq!(info.formats[0].height, Some(720));
    assert_eq!(info.formats[0].bitrate, Some(1500.0));
    assert_eq!(info.formats[1].height, None);
    assert_eq!(info.formats[1].bitrate, None);
    assert!(info.formats[1].is_candidate());
}
