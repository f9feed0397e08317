//! Output types: the generated script, per-line audio results, and run stats.
//!
//! Everything here is serde-serialisable so the CLI's `--json` mode can dump
//! a structured record of the run. Raw audio bytes are deliberately excluded
//! from serialisation — a JSON report with megabytes of inlined audio is
//! useless; callers who want the bytes read them from [`LineResult::audio`]
//! directly.

use crate::error::LineError;
use serde::{Deserialize, Serialize};

/// The two fixed conversational roles in a generated script.
///
/// Upstream models occasionally emit a role outside the contract (or omit the
/// field entirely); both cases map to [`Speaker::Guest`], the default
/// non-Host role, so the line still gets a voice and a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Host,
    #[serde(other)]
    Guest,
}

impl Default for Speaker {
    // Unknown/absent speakers render as the non-Host role.
    fn default() -> Self {
        Speaker::Guest
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Host => write!(f, "Host"),
            Speaker::Guest => write!(f, "Guest"),
        }
    }
}

/// One utterance of the generated dialogue, in conversational order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    #[serde(default)]
    pub speaker: Speaker,
    #[serde(default)]
    pub text: String,
}

/// The result of synthesising one script line.
///
/// `audio` is empty exactly when `error` is `Some`: every synthesis failure
/// is converted into a "no audio for this line" outcome rather than an
/// abort, so the run continues to the next line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineResult {
    /// 1-indexed position in the script.
    pub line_num: usize,

    /// Who speaks this line.
    pub speaker: Speaker,

    /// The utterance that was sent to the speech API.
    pub text: String,

    /// The voice profile used for this line.
    pub voice_id: String,

    /// Raw MP3-compatible audio bytes; empty when `error` is set.
    #[serde(skip)]
    pub audio: Vec<u8>,

    /// Byte length of `audio` (kept in the JSON report even though the
    /// bytes themselves are skipped).
    pub audio_bytes: usize,

    /// Wall-clock time spent on this line's request/decode cycle.
    pub duration_ms: u64,

    /// Set when this line produced no playable audio.
    pub error: Option<LineError>,
}

/// Aggregate statistics for one podcast generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodcastStats {
    /// Script lines produced by the model (after empty-text filtering).
    pub script_lines: usize,

    /// Lines that yielded playable audio.
    pub synthesized_lines: usize,

    /// Lines that failed synthesis or decoding.
    pub failed_lines: usize,

    /// Total decoded audio across all lines, in bytes.
    pub total_audio_bytes: u64,

    /// End-to-end wall-clock duration.
    pub total_duration_ms: u64,

    /// Time spent in the chat-completion call.
    pub script_duration_ms: u64,

    /// Time spent across all speech-synthesis calls.
    pub synth_duration_ms: u64,
}

/// Complete result of a podcast generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodcastOutput {
    /// Characters of source text fed to the script generator.
    pub source_chars: usize,

    /// The generated dialogue, in conversational order.
    pub script: Vec<ScriptLine>,

    /// One entry per script line, in script order.
    pub lines: Vec<LineResult>,

    /// Aggregate run statistics.
    pub stats: PodcastStats,
}

impl PodcastOutput {
    /// Iterate over lines that produced playable audio, in script order.
    pub fn playable_lines(&self) -> impl Iterator<Item = &LineResult> {
        self.lines.iter().filter(|l| l.error.is_none())
    }
}
