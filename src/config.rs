//! Configuration types for podcast generation.
//!
//! All behaviour is controlled through [`PodcastConfig`], built via its
//! [`PodcastConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, serialise the interesting parts for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! Credentials are resolved exactly once, up front, into a [`Credentials`]
//! value that the two API clients receive explicitly — no ambient
//! environment reads at call sites mid-pipeline.

use crate::error::PodPaperError;
use crate::output::Speaker;
use crate::pipeline::script::ScriptGenerator;
use crate::pipeline::synth::SpeechSynthesizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default base URL for the MiniMax APIs.
pub const DEFAULT_BASE_URL: &str = "https://api.minimax.io";

/// Default chat-completion model for script generation.
pub const DEFAULT_SCRIPT_MODEL: &str = "MiniMax-Text-01";

/// Default speech-synthesis model.
pub const DEFAULT_SPEECH_MODEL: &str = "speech-01-hd";

/// Default voice profile for the Host role.
pub const HOST_VOICE_ID: &str = "male-qn-qingse";

/// Default voice profile for the Guest role.
pub const GUEST_VOICE_ID: &str = "female-shaonv";

/// Fixed speaker → voice-profile mapping, constant for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceMap {
    pub host: String,
    pub guest: String,
}

impl Default for VoiceMap {
    fn default() -> Self {
        Self {
            host: HOST_VOICE_ID.to_string(),
            guest: GUEST_VOICE_ID.to_string(),
        }
    }
}

impl VoiceMap {
    /// Voice profile for a speaker. Unknown speakers were already folded
    /// into [`Speaker::Guest`] at parse time, so this is total.
    pub fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Host => &self.host,
            Speaker::Guest => &self.guest,
        }
    }
}

/// Resolved API credentials, constructed once before any processing.
#[derive(Clone)]
pub struct Credentials {
    /// Bearer token for both MiniMax endpoints.
    pub api_key: String,
    /// Tenant/group identifier, sent as a query parameter on speech calls.
    pub group_id: String,
}

impl fmt::Debug for Credentials {
    // Never leak the key into logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("group_id", &self.group_id)
            .finish()
    }
}

/// Configuration for a podcast generation run.
///
/// Built via [`PodcastConfig::builder()`] or [`PodcastConfig::default()`].
///
/// # Example
/// ```rust
/// use podpaper::PodcastConfig;
///
/// let config = PodcastConfig::builder()
///     .api_key("sk-...")
///     .group_id("1234567890")
///     .host_voice("male-qn-qingse")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PodcastConfig {
    /// MiniMax API key. If None, read from `MINIMAX_API_KEY` at resolution
    /// time; still absent → the run halts with [`PodPaperError::MissingApiKey`]
    /// before any processing.
    pub api_key: Option<String>,

    /// MiniMax group/tenant identifier. If None, read from `GROUP_ID`;
    /// still absent → halts with [`PodPaperError::MissingGroupId`].
    pub group_id: Option<String>,

    /// Base URL for both APIs. Override for proxies or compatible endpoints.
    pub base_url: String,

    /// Chat-completion model used for script generation.
    pub script_model: String,

    /// Speech-synthesis model.
    pub speech_model: String,

    /// Speaker → voice-profile mapping.
    pub voices: VoiceMap,

    /// Maximum number of leading pages to read from the document. Default: 2.
    ///
    /// Two pages is enough source material for a short dialogue while keeping
    /// the prompt well inside the model's context window; the rest of the
    /// document is never read.
    pub max_pages: usize,

    /// Timeout for the single chat-completion call, in seconds. Default: 60.
    pub script_timeout_secs: u64,

    /// Timeout for each speech-synthesis call, in seconds. Default: 120.
    ///
    /// Audio synthesis is slower than text completion, so each line gets a
    /// longer bounded wait than the script call.
    pub audio_timeout_secs: u64,

    /// Pre-constructed script generator. Takes precedence over the default
    /// MiniMax client; used by tests and embedders.
    pub generator: Option<Arc<dyn ScriptGenerator>>,

    /// Pre-constructed speech synthesizer. Takes precedence over the default
    /// MiniMax client; used by tests and embedders.
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,

    /// Progress callback for per-line events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            group_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voices: VoiceMap::default(),
            max_pages: 2,
            script_timeout_secs: 60,
            audio_timeout_secs: 120,
            generator: None,
            synthesizer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PodcastConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PodcastConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("group_id", &self.group_id)
            .field("base_url", &self.base_url)
            .field("script_model", &self.script_model)
            .field("speech_model", &self.speech_model)
            .field("voices", &self.voices)
            .field("max_pages", &self.max_pages)
            .field("script_timeout_secs", &self.script_timeout_secs)
            .field("audio_timeout_secs", &self.audio_timeout_secs)
            .field("generator", &self.generator.as_ref().map(|_| "<dyn ScriptGenerator>"))
            .field(
                "synthesizer",
                &self.synthesizer.as_ref().map(|_| "<dyn SpeechSynthesizer>"),
            )
            .finish()
    }
}

impl PodcastConfig {
    /// Create a new builder for `PodcastConfig`.
    pub fn builder() -> PodcastConfigBuilder {
        PodcastConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve credentials from the config, falling back to the environment.
    ///
    /// Resolution order per field: explicit config value, then environment
    /// variable (`MINIMAX_API_KEY` / `GROUP_ID`). Absence of either halts
    /// the run before any document processing happens.
    pub fn resolve_credentials(&self) -> Result<Credentials, PodPaperError> {
        let api_key = match &self.api_key {
            Some(k) if !k.is_empty() => k.clone(),
            _ => std::env::var("MINIMAX_API_KEY")
                .ok()
                .filter(|k| !k.is_empty())
                .ok_or(PodPaperError::MissingApiKey)?,
        };

        let group_id = match &self.group_id {
            Some(g) if !g.is_empty() => g.clone(),
            _ => std::env::var("GROUP_ID")
                .ok()
                .filter(|g| !g.is_empty())
                .ok_or(PodPaperError::MissingGroupId)?,
        };

        Ok(Credentials { api_key, group_id })
    }
}

/// Builder for [`PodcastConfig`].
#[derive(Debug)]
pub struct PodcastConfigBuilder {
    config: PodcastConfig,
}

impl PodcastConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn group_id(mut self, id: impl Into<String>) -> Self {
        self.config.group_id = Some(id.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn script_model(mut self, model: impl Into<String>) -> Self {
        self.config.script_model = model.into();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.config.speech_model = model.into();
        self
    }

    pub fn host_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.voices.host = voice.into();
        self
    }

    pub fn guest_voice(mut self, voice: impl Into<String>) -> Self {
        self.config.voices.guest = voice.into();
        self
    }

    pub fn voices(mut self, voices: VoiceMap) -> Self {
        self.config.voices = voices;
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn script_timeout_secs(mut self, secs: u64) -> Self {
        self.config.script_timeout_secs = secs;
        self
    }

    pub fn audio_timeout_secs(mut self, secs: u64) -> Self {
        self.config.audio_timeout_secs = secs;
        self
    }

    pub fn generator(mut self, generator: Arc<dyn ScriptGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.config.synthesizer = Some(synthesizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PodcastConfig, PodPaperError> {
        let c = &self.config;
        if c.max_pages == 0 {
            return Err(PodPaperError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if c.script_timeout_secs == 0 || c.audio_timeout_secs == 0 {
            return Err(PodPaperError::InvalidConfig(
                "timeouts must be non-zero".into(),
            ));
        }
        if c.base_url.is_empty() {
            return Err(PodPaperError::InvalidConfig("base_url must not be empty".into()));
        }
        if c.voices.host.is_empty() || c.voices.guest.is_empty() {
            return Err(PodPaperError::InvalidConfig(
                "voice identifiers must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = PodcastConfig::default();
        assert_eq!(c.max_pages, 2);
        assert_eq!(c.script_timeout_secs, 60);
        assert_eq!(c.audio_timeout_secs, 120);
        assert_eq!(c.script_model, "MiniMax-Text-01");
        assert_eq!(c.speech_model, "speech-01-hd");
        assert_eq!(c.voices.host, HOST_VOICE_ID);
        assert_eq!(c.voices.guest, GUEST_VOICE_ID);
    }

    #[test]
    fn builder_clamps_max_pages() {
        let c = PodcastConfig::builder().max_pages(0).build().unwrap();
        assert_eq!(c.max_pages, 1);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = PodcastConfig::builder()
            .script_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PodPaperError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_voice() {
        let err = PodcastConfig::builder().host_voice("").build().unwrap_err();
        assert!(matches!(err, PodPaperError::InvalidConfig(_)));
    }

    #[test]
    fn voice_map_routes_by_speaker() {
        let voices = VoiceMap {
            host: "voice-a".into(),
            guest: "voice-b".into(),
        };
        assert_eq!(voices.voice_for(Speaker::Host), "voice-a");
        assert_eq!(voices.voice_for(Speaker::Guest), "voice-b");
    }

    #[test]
    fn explicit_credentials_win_over_env() {
        let config = PodcastConfig::builder()
            .api_key("explicit-key")
            .group_id("explicit-group")
            .build()
            .unwrap();
        let creds = config.resolve_credentials().unwrap();
        assert_eq!(creds.api_key, "explicit-key");
        assert_eq!(creds.group_id, "explicit-group");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = PodcastConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
