//! Prompts for podcast-script generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening the output contract (the JSON
//!    shape, the turn length) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect the prompt directly without a
//!    live model, making contract regressions easy to catch.

/// System prompt sent with every script-generation request.
///
/// The "Return ONLY a JSON list" instruction is load-bearing: the parser in
/// [`crate::pipeline::script`] expects a bare JSON array (it tolerates a
/// markdown fence wrapper, nothing more).
pub const SCRIPT_SYSTEM_PROMPT: &str = r#"You are a podcast script writer. Summarize the given text into an engaging dialogue between two podcasters (Host and Guest).
The Host introduces topics and asks questions, while the Guest provides insights and explanations.
Make the conversation natural, informative, and engaging.

Return ONLY a JSON list of objects in this exact format, with no additional text or markdown:
[{"speaker": "Host", "text": "..."}, {"speaker": "Guest", "text": "..."}, ...]

Keep each speaker's text concise (1-3 sentences per turn) for better audio generation."#;

/// Build the user message carrying the extracted document text.
pub fn script_user_prompt(source_text: &str) -> String {
    format!("Create a podcast script from this text:\n\n{source_text}")
}
