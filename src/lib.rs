//! # podpaper
//!
//! Turn the opening pages of a PDF paper into a short two-speaker podcast
//! using the MiniMax chat-completion and text-to-audio APIs.
//!
//! ```text
//! ┌─────────┐    ┌─────────────┐    ┌──────────────┐    ┌───────────────┐
//! │  PDF    │───▶│ text extract│───▶│ script (LLM) │───▶│ per-line TTS  │
//! │  file   │    │ (≤ 2 pages) │    │ Host ⇄ Guest │    │ hex/b64 decode│
//! └─────────┘    └─────────────┘    └──────────────┘    └───────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use podpaper::{generate, PodcastConfig};
//!
//! # async fn run() -> Result<(), podpaper::PodPaperError> {
//! let config = PodcastConfig::builder()
//!     .api_key("sk-...")
//!     .group_id("1234567890")
//!     .build()?;
//!
//! let output = generate("paper.pdf", &config).await?;
//! for line in output.playable_lines() {
//!     println!("[{}] {} ({} bytes)", line.speaker, line.text, line.audio_bytes);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! Anything that invalidates the whole run — unreadable input, missing
//! credentials, a failed or empty script — returns [`PodPaperError`]. A
//! single line failing to synthesise does not: it becomes a
//! [`LineResult`] with an attached [`LineError`] and the run continues, so
//! one flaky speech call never costs you the episode.
//!
//! ## Modules
//!
//! * [`config`] — builder-style configuration and credential resolution
//! * [`error`] — fatal vs per-line error types
//! * [`generate`](crate::generate()) — top-level entry points
//! * [`output`] — script, per-line results, and run statistics
//! * [`pipeline`] — the extract / script / synth / decode stages
//! * [`progress`] — per-line progress callbacks
//! * [`prompts`] — the script-generation prompt contract

pub mod config;
pub mod error;
mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

pub use config::{
    Credentials, PodcastConfig, PodcastConfigBuilder, VoiceMap, DEFAULT_BASE_URL,
    DEFAULT_SCRIPT_MODEL, DEFAULT_SPEECH_MODEL, GUEST_VOICE_ID, HOST_VOICE_ID,
};
pub use error::{LineError, PodPaperError, SynthError};
pub use generate::{generate, generate_from_bytes, generate_from_text, generate_sync};
pub use output::{LineResult, PodcastOutput, PodcastStats, ScriptLine, Speaker};
pub use pipeline::script::{parse_script, MiniMaxScriptClient, ScriptGenerator};
pub use pipeline::synth::{MiniMaxSpeechClient, SpeechSynthesizer};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
