//! The frame-grab pipeline.
//!
//! [`FrameGrabber`] is the main entry point of the crate. It owns the two
//! external capabilities (a [`MetadataSource`] and a [`FrameDecoder`]) and
//! runs the whole invocation strictly in sequence:
//!
//! 1. validate the video id and clamp the timestamp,
//! 2. fetch metadata for the watch URL,
//! 3. select the best format,
//! 4. merge global and per-format headers,
//! 5. capture one frame (with the seek fallback),
//! 6. wrap the JPEG into a [`FramePayload`].

use crate::{
    capture::{CaptureRequest, FrameDecoder, capture_frame},
    configuration::GrabConfig,
    error::FramegrabError,
    ffmpeg::Ffmpeg,
    format::select_best_format,
    metadata::{MetadataSource, VideoInfo, YtDlp},
    payload::FramePayload,
    validation::{clamp_timestamp, normalize_video_id, watch_url},
};

/// Grabs single frames from YouTube videos.
///
/// # Example
///
/// ```no_run
/// use framegrab::{FrameGrabber, FramegrabError, GrabConfig};
///
/// # async fn example() -> Result<(), FramegrabError> {
/// let grabber = FrameGrabber::from_config(&GrabConfig::new());
/// let payload = grabber.grab("dQw4w9WgXcQ", 42.0).await?;
/// println!("{:?}x{:?}", payload.width, payload.height);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FrameGrabber<M, D> {
    metadata: M,
    decoder: D,
}

impl FrameGrabber<YtDlp, Ffmpeg> {
    /// Create a grabber that shells out to `yt-dlp` and `ffmpeg` as
    /// configured.
    pub fn from_config(config: &GrabConfig) -> Self {
        Self::new(YtDlp::from_config(config), Ffmpeg::from_config(config))
    }
}

impl<M, D> FrameGrabber<M, D>
where
    M: MetadataSource,
    D: FrameDecoder,
{
    /// Create a grabber from explicit capabilities.
    pub fn new(metadata: M, decoder: D) -> Self {
        Self { metadata, decoder }
    }

    /// The metadata capability.
    pub fn metadata_source(&self) -> &M {
        &self.metadata
    }

    /// The decoder capability.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Grab the frame at `timestamp_seconds` of video `video_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FramegrabError::MissingVideoId`] before any external call
    /// when the id is blank. Otherwise any metadata, selection, or capture
    /// error is returned unchanged.
    pub async fn grab(
        &self,
        video_id: &str,
        timestamp_seconds: f64,
    ) -> Result<FramePayload, FramegrabError> {
        let video_id = normalize_video_id(video_id)?;
        let timestamp_seconds = clamp_timestamp(timestamp_seconds);
        let watch_url = watch_url(video_id);

        let raw = self.metadata.fetch(&watch_url).await?;
        let info = VideoInfo::from_value(raw)?;

        let selected = select_best_format(&info.formats)?;
        let stream_url = selected
            .stream_url()
            .ok_or(FramegrabError::NoPlayableFormat)?;

        let request = CaptureRequest::new(stream_url, timestamp_seconds)
            .with_headers(info.headers_for(selected));
        let jpeg = capture_frame(&self.decoder, &request).await?;

        log::info!(
            "Captured {} bytes from {video_id} at {}s",
            jpeg.len(),
            request.seek_position()
        );

        Ok(FramePayload::from_jpeg(
            &jpeg,
            selected.width,
            selected.height,
        ))
    }
}
