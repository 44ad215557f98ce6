//! # framegrab
//!
//! Grab a single still frame from a YouTube video at a given timestamp.
//!
//! `framegrab` asks [`yt-dlp`](https://github.com/yt-dlp/yt-dlp) for a
//! video's stream formats, picks the one most likely to decode cleanly, and
//! has [`ffmpeg`](https://ffmpeg.org) seek into it and emit one JPEG frame.
//! Both tools run as child processes; nothing is downloaded to disk.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framegrab::{FrameGrabber, GrabConfig};
//!
//! # async fn example() -> Result<(), framegrab::FramegrabError> {
//! let grabber = FrameGrabber::from_config(&GrabConfig::new());
//! let payload = grabber.grab("dQw4w9WgXcQ", 12.5).await?;
//! let jpeg = payload.jpeg_bytes().expect("payload is valid base64");
//! std::fs::write("frame.jpg", jpeg)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! - **Format selection**: audio-only and URL-less formats are dropped; the
//!   rest are ranked by MP4 container, plain HTTP(S) delivery, height
//!   (capped at 1080p), then bitrate. See [`select_best_format`].
//! - **Frame capture**: the first attempt seeks before opening the input
//!   (fast); if FFmpeg fails or writes nothing, one retry seeks after opening
//!   it (frame-accurate, slower). See [`capture_frame`].
//! - **Capabilities**: the extractor and the decoder sit behind the
//!   [`MetadataSource`] and [`FrameDecoder`] traits so either can be replaced,
//!   e.g. by fakes in tests.
//! - **Timeouts**: every child process can be bounded; a timed-out primary
//!   capture attempt counts as a failed seek and triggers the fallback.
//!
//! ## Requirements
//!
//! `yt-dlp` and `ffmpeg` must be installed, either on `PATH` or at the
//! locations given in [`GrabConfig`].

pub mod capture;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod grabber;
pub mod metadata;
pub mod payload;
pub mod process;
mod utilities;
pub mod validation;

pub use capture::{CaptureRequest, DecodeOutput, FrameDecoder, SeekStrategy, capture_frame};
pub use configuration::GrabConfig;
pub use error::FramegrabError;
pub use ffmpeg::{Ffmpeg, FfmpegLogLevel};
pub use format::{FormatRecord, HEIGHT_CAP, SelectionScore, select_best_format};
pub use grabber::FrameGrabber;
pub use metadata::{HeaderMap, MetadataSource, VideoInfo, YtDlp, merge_headers};
pub use payload::{ErrorPayload, FramePayload, JPEG_MIME_TYPE, to_json_line};
pub use validation::{clamp_timestamp, normalize_video_id, watch_url};
