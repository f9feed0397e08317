//! Speech synthesis: one script line → raw MP3-compatible bytes.
//!
//! The [`SpeechSynthesizer`] trait is the seam between the pipeline and the
//! speech API. The per-line driver [`synthesize_line`] never propagates an
//! error upward — every failure becomes a [`crate::output::LineResult`] with
//! empty audio and a populated error, so a single bad line cannot abort the
//! episode. This is the deliberate opposite of the script stage, where any
//! failure is fatal.

use crate::config::{Credentials, PodcastConfig};
use crate::error::SynthError;
use crate::output::{LineResult, ScriptLine};
use crate::pipeline::decode;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fixed synthesis parameters; not configurable per call.
const SPEECH_SPEED: f32 = 1.0;
const SPEECH_VOLUME: f32 = 1.0;
const SPEECH_PITCH: i32 = 0;

/// Converts one utterance into decoded audio bytes for a given voice.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given voice profile.
    ///
    /// Implementations report failures through [`SynthError`]; they never
    /// panic past this boundary. An `Ok(Vec::new())` is treated as success
    /// with no audio (tolerated, not expected).
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    text: &'a str,
    voice_setting: VoiceSetting<'a>,
}

#[derive(Debug, Serialize)]
struct VoiceSetting<'a> {
    voice_id: &'a str,
    speed: f32,
    vol: f32,
    pitch: i32,
}

// ── MiniMax client ───────────────────────────────────────────────────────

/// Speech synthesizer backed by the MiniMax text-to-audio endpoint.
pub struct MiniMaxSpeechClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl MiniMaxSpeechClient {
    pub fn new(
        credentials: Credentials,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Reuse a shared HTTP client (connection pooling across both APIs).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/t2a_v2", self.base_url)
    }
}

#[async_trait]
impl SpeechSynthesizer for MiniMaxSpeechClient {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthError> {
        let request = SpeechRequest {
            model: &self.model,
            text,
            voice_setting: VoiceSetting {
                voice_id,
                speed: SPEECH_SPEED,
                vol: SPEECH_VOLUME,
                pitch: SPEECH_PITCH,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("GroupId", self.credentials.group_id.as_str())])
            .bearer_auth(&self.credentials.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthError::Transport(format!("HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SynthError::Transport(format!("invalid JSON body: {e}")))?;

        decode::extract_audio(&body)
    }
}

// ── Per-line driver ──────────────────────────────────────────────────────

/// Synthesize a single script line, converting every failure into an
/// observable "no audio for this line" result.
///
/// Always returns a `LineResult` — never an `Err` — so the caller's loop
/// continues to the next line regardless of what happened here.
pub async fn synthesize_line(
    synthesizer: &dyn SpeechSynthesizer,
    line_num: usize,
    line: &ScriptLine,
    config: &PodcastConfig,
) -> LineResult {
    let start = Instant::now();
    let voice_id = config.voices.voice_for(line.speaker).to_string();

    match synthesizer.synthesize(&line.text, &voice_id).await {
        Ok(audio) => {
            let duration = start.elapsed();
            debug!(
                "Line {}: {} bytes of audio in {:?}",
                line_num,
                audio.len(),
                duration
            );
            LineResult {
                line_num,
                speaker: line.speaker,
                text: line.text.clone(),
                voice_id,
                audio_bytes: audio.len(),
                audio,
                duration_ms: duration.as_millis() as u64,
                error: None,
            }
        }
        Err(e) => {
            let duration = start.elapsed();
            warn!("Line {}: synthesis failed — {}", line_num, e);
            LineResult {
                line_num,
                speaker: line.speaker,
                text: line.text.clone(),
                voice_id,
                audio: Vec::new(),
                audio_bytes: 0,
                duration_ms: duration.as_millis() as u64,
                error: Some(e.into_line_error(line_num)),
            }
        }
    }
}
