use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use framegrab::{
    ErrorPayload, FfmpegLogLevel, FrameGrabber, FramePayload, FramegrabError, GrabConfig,
    to_json_line,
};

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab --video-id dQw4w9WgXcQ --timestamp 42\n  framegrab --video-id dQw4w9WgXcQ --timestamp 12.5 --ffmpeg /opt/ffmpeg/bin/ffmpeg --decoder-timeout 30\n  RUST_LOG=framegrab=debug framegrab --video-id dQw4w9WgXcQ --timestamp 0\n\nExit codes:\n  0  frame printed as JSON on stdout\n  1  extraction failed, error JSON on stderr\n  2  missing video id";

/// Message of the failure envelope for everything except a missing id.
const EXTRACTION_FAILED: &str = "Failed to extract frame from YouTube.";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Grab one JPEG frame from a YouTube video and print it as base64 JSON",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// YouTube video id (the `v` parameter of a watch URL).
    #[arg(long)]
    video_id: String,

    /// Offset into the video in seconds. Negative values are clamped to 0.
    #[arg(long, allow_negative_numbers = true)]
    timestamp: f64,

    /// Path to the ffmpeg executable.
    #[arg(long, env = "FRAMEGRAB_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Path to the yt-dlp executable.
    #[arg(long = "yt-dlp", env = "FRAMEGRAB_YTDLP", default_value = "yt-dlp")]
    ytdlp: PathBuf,

    /// Seconds each ffmpeg attempt may run (0 disables the limit).
    #[arg(long, default_value_t = 60)]
    decoder_timeout: u64,

    /// Seconds yt-dlp may run (0 disables the limit).
    #[arg(long, default_value_t = 120)]
    metadata_timeout: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    ffmpeg_log_level: FfmpegLogLevel,

    /// Log pipeline progress to stderr.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> GrabConfig {
        GrabConfig::new()
            .with_ffmpeg_path(&self.ffmpeg)
            .with_ytdlp_path(&self.ytdlp)
            .with_decoder_timeout(Some(Duration::from_secs(self.decoder_timeout)))
            .with_metadata_timeout(Some(Duration::from_secs(self.metadata_timeout)))
            .with_ffmpeg_log_level(self.ffmpeg_log_level)
    }
}

/// stderr carries the error envelope, so logging stays off unless asked for.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"));
    if verbose {
        builder.filter_module("framegrab", log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

fn error_envelope(error: &FramegrabError) -> (ErrorPayload, ExitCode) {
    match error {
        FramegrabError::MissingVideoId => (ErrorPayload::new(error.to_string()), ExitCode::from(2)),
        _ => (
            ErrorPayload::new(EXTRACTION_FAILED).with_details(error.to_string()),
            ExitCode::FAILURE,
        ),
    }
}

fn report_success(payload: &FramePayload) -> ExitCode {
    match to_json_line(payload) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(error) => report_failure(&error),
    }
}

fn report_failure(error: &FramegrabError) -> ExitCode {
    let (payload, code) = error_envelope(error);
    match to_json_line(&payload) {
        Ok(line) => eprintln!("{line}"),
        Err(_) => eprintln!(r#"{{"error": "{EXTRACTION_FAILED}"}}"#),
    }
    code
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let grabber = FrameGrabber::from_config(&cli.config());
    match grabber.grab(&cli.video_id, cli.timestamp).await {
        Ok(payload) => report_success(&payload),
        Err(error) => report_failure(&error),
    }
}
