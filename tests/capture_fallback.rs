//! Seek fallback integration tests, driven by a scripted fake decoder.

use std::{io, sync::Mutex, time::Duration};

use async_trait::async_trait;
use framegrab::{
    CaptureRequest, DecodeOutput, FrameDecoder, FramegrabError, SeekStrategy, capture_frame,
};

/// What the fake decoder does for one strategy.
#[derive(Clone)]
enum Outcome {
    Frame(&'static [u8]),
    Exit(i32, &'static str),
    Empty,
    Timeout,
    Missing,
}

struct ScriptedDecoder {
    pre_input: Outcome,
    post_input: Outcome,
    calls: Mutex<Vec<SeekStrategy>>,
}

impl ScriptedDecoder {
    fn new(pre_input: Outcome, post_input: Outcome) -> Self {
        Self {
            pre_input,
            post_input,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<SeekStrategy> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FrameDecoder for ScriptedDecoder {
    async fn decode(
        &self,
        _request: &CaptureRequest,
        strategy: SeekStrategy,
    ) -> Result<DecodeOutput, FramegrabError> {
        self.calls.lock().unwrap().push(strategy);
        let outcome = match strategy {
            SeekStrategy::PreInput => self.pre_input.clone(),
            SeekStrategy::PostInput => self.post_input.clone(),
        };
        match outcome {
            Outcome::Frame(bytes) => Ok(DecodeOutput {
                success: true,
                exit_code: Some(0),
                stdout: bytes.to_vec(),
                stderr: Vec::new(),
            }),
            Outcome::Exit(code, stderr) => Ok(DecodeOutput {
                success: false,
                exit_code: Some(code),
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            }),
            Outcome::Empty => Ok(DecodeOutput {
                success: true,
                exit_code: Some(0),
                ..DecodeOutput::default()
            }),
            Outcome::Timeout => Err(FramegrabError::Timeout {
                program: "ffmpeg".to_string(),
                limit: Duration::from_secs(60),
            }),
            Outcome::Missing => Err(FramegrabError::Spawn {
                program: "ffmpeg".to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}

fn request() -> CaptureRequest {
    CaptureRequest::new("https://a/720", 12.5)
}

#[tokio::test]
async fn primary_success_makes_one_call() {
    let decoder = ScriptedDecoder::new(Outcome::Frame(b"jpeg"), Outcome::Frame(b"other"));
    let frame = capture_frame(&decoder, &request()).await.unwrap();
    assert_eq!(frame, b"jpeg");
    assert_eq!(decoder.calls(), vec![SeekStrategy::PreInput]);
}

#[tokio::test]
async fn nonzero_exit_falls_back_once() {
    let decoder = ScriptedDecoder::new(
        Outcome::Exit(1, "Invalid data found when processing input"),
        Outcome::Frame(b"jpeg"),
    );
    let frame = capture_frame(&decoder, &request()).await.unwrap();
    assert_eq!(frame, b"jpeg");
    assert_eq!(
        decoder.calls(),
        vec![SeekStrategy::PreInput, SeekStrategy::PostInput]
    );
}

#[tokio::test]
async fn empty_output_falls_back() {
    let decoder = ScriptedDecoder::new(Outcome::Empty, Outcome::Frame(b"jpeg"));
    assert_eq!(capture_frame(&decoder, &request()).await.unwrap(), b"jpeg");
    assert_eq!(decoder.calls().len(), 2);
}

#[tokio::test]
async fn double_failure_reports_post_input_diagnostics() {
    let decoder = ScriptedDecoder::new(
        Outcome::Exit(1, "pre-input problem"),
        Outcome::Exit(1, "  Server returned 403 Forbidden\n"),
    );
    let error = capture_frame(&decoder, &request()).await.unwrap_err();

    assert_eq!(
        error.to_string(),
        "ffmpeg failed (post-input seek): Server returned 403 Forbidden"
    );
    assert!(!error.to_string().contains("pre-input problem"));
    assert_eq!(decoder.calls().len(), 2);
}

#[tokio::test]
async fn primary_timeout_triggers_fallback() {
    let decoder = ScriptedDecoder::new(Outcome::Timeout, Outcome::Frame(b"jpeg"));
    assert_eq!(capture_frame(&decoder, &request()).await.unwrap(), b"jpeg");
    assert_eq!(
        decoder.calls(),
        vec![SeekStrategy::PreInput, SeekStrategy::PostInput]
    );
}

#[tokio::test]
async fn fallback_timeout_is_a_capture_failure() {
    let decoder = ScriptedDecoder::new(Outcome::Empty, Outcome::Timeout);
    let error = capture_frame(&decoder, &request()).await.unwrap_err();
    assert!(matches!(
        error,
        FramegrabError::Capture {
            strategy: SeekStrategy::PostInput,
            ..
        }
    ));
    assert!(error.to_string().contains("timed out"));
}

#[tokio::test]
async fn missing_decoder_is_not_retried() {
    let decoder = ScriptedDecoder::new(Outcome::Missing, Outcome::Frame(b"jpeg"));
    let error = capture_frame(&decoder, &request()).await.unwrap_err();
    assert!(matches!(error, FramegrabError::Spawn { .. }));
    assert_eq!(decoder.calls(), vec![SeekStrategy::PreInput]);
}
