//! Script generation: extracted text → ordered Host/Guest dialogue.
//!
//! The [`ScriptGenerator`] trait is the seam between the pipeline and the
//! chat-completion API; tests and embedders swap in a stub, production uses
//! [`MiniMaxScriptClient`]. All failures here are fatal to the run — there is
//! no partial-line recovery and no retry — so the trait returns
//! `Result<Vec<ScriptLine>, PodPaperError>` rather than hiding errors in the
//! payload.
//!
//! ## Response defensiveness
//!
//! The system prompt demands a bare JSON array, but models routinely wrap
//! structured output in a markdown fence anyway. The parser strips one outer
//! fence (` ```json ` or bare ` ``` `) before parsing strictly; anything else
//! malformed is a [`PodPaperError::ScriptParse`].

use crate::config::Credentials;
use crate::error::PodPaperError;
use crate::output::ScriptLine;
use crate::prompts::{script_user_prompt, SCRIPT_SYSTEM_PROMPT};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Produces an ordered dialogue from non-empty source text.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate the script. An empty vec is a *valid* empty script; the
    /// caller turns it into [`PodPaperError::EmptyScript`].
    async fn generate_script(&self, source_text: &str) -> Result<Vec<ScriptLine>, PodPaperError>;
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

// ── MiniMax client ───────────────────────────────────────────────────────

/// Script generator backed by the MiniMax chat-completion endpoint.
pub struct MiniMaxScriptClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl MiniMaxScriptClient {
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
        format!("{}/v1/text/chatcompletion_v2", self.base_url)
    }
}

#[async_trait]
impl ScriptGenerator for MiniMaxScriptClient {
    async fn generate_script(&self, source_text: &str) -> Result<Vec<ScriptLine>, PodPaperError> {
        let user_prompt = script_user_prompt(source_text);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SCRIPT_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.credentials.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| PodPaperError::ScriptTransport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PodPaperError::ScriptTransport {
                reason: format!("HTTP {status}"),
            });
        }

        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| PodPaperError::ScriptParse {
                    detail: format!("response body was not valid JSON: {e}"),
                })?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| PodPaperError::ScriptParse {
                detail: "response contained no choices".to_string(),
            })?;

        debug!("Model returned {} chars of script content", content.len());
        parse_script(content)
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

/// Strip one outer markdown fence (JSON-tagged or bare), if present.
fn strip_code_fences(content: &str) -> &str {
    match RE_OUTER_FENCES.captures(content.trim()) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => content.trim(),
    }
}

/// Parse model output into an ordered script.
///
/// Strips a fence wrapper, parses strictly as a JSON array of
/// `{speaker, text}` objects, and drops lines whose text is blank — an
/// empty utterance must never reach the speech stage. A well-formed empty
/// array parses to an empty vec (the caller reports it distinctly).
pub fn parse_script(content: &str) -> Result<Vec<ScriptLine>, PodPaperError> {
    let cleaned = strip_code_fences(content);

    let lines: Vec<ScriptLine> =
        serde_json::from_str(cleaned).map_err(|e| PodPaperError::ScriptParse {
            detail: e.to_string(),
        })?;

    let before = lines.len();
    let lines: Vec<ScriptLine> = lines
        .into_iter()
        .filter(|l| !l.text.trim().is_empty())
        .collect();
    if lines.len() < before {
        warn!("Dropped {} script line(s) with empty text", before - lines.len());
    }

    Ok(lines)
}
