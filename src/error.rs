//! Error types for the podpaper library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PodPaperError`] — **Fatal**: the run cannot proceed at all (bad input
//!   file, missing credentials, the script stage failed). Returned as
//!   `Err(PodPaperError)` from the top-level `generate*` functions.
//!
//! * [`LineError`] — **Non-fatal**: a single script line produced no playable
//!   audio (transport blip, unrecognised payload shape, undecodable payload)
//!   but every other line is fine. Stored inside
//!   [`crate::output::LineResult`] so callers see partial success rather than
//!   losing the whole episode to one bad line.
//!
//! Extraction and script failures halt the run because everything downstream
//! depends on them; audio failures are isolated per line by design.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the podpaper library.
///
/// Per-line audio failures use [`LineError`] and are stored in
/// [`crate::output::LineResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PodPaperError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document could not be parsed at all (corrupt/unsupported).
    #[error("Failed to extract text from the PDF: {detail}\nTry a different file.")]
    ExtractionFailed { detail: String },

    /// The document parsed but its first pages yielded no usable text.
    #[error(
        "No extractable text in the first {pages_read} page(s) of the document.\n\
         Scanned/image-only PDFs are not supported."
    )]
    EmptyExtraction { pages_read: usize },

    // ── Configuration errors ──────────────────────────────────────────────
    /// No API credential was supplied in config or environment.
    #[error(
        "Missing MiniMax API credential.\n\
         Set the MINIMAX_API_KEY environment variable or pass --api-key."
    )]
    MissingApiKey,

    /// No tenant/group identifier was supplied in config or environment.
    #[error(
        "Missing MiniMax group identifier.\n\
         Set the GROUP_ID environment variable or pass --group-id."
    )]
    MissingGroupId,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Script-stage errors ───────────────────────────────────────────────
    /// The chat-completion request failed at the transport level.
    #[error("Script request failed: {reason}\nCheck your network connection and API key.")]
    ScriptTransport { reason: String },

    /// The model response could not be parsed into a script.
    #[error("Failed to parse the generated script: {detail}")]
    ScriptParse { detail: String },

    /// The model returned a well-formed but empty script.
    #[error(
        "The model returned an empty script for this document.\n\
         Try again or use a longer document."
    )]
    EmptyScript,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output audio file.
    #[error("Failed to write audio file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single script line.
///
/// Stored alongside [`crate::output::LineResult`] when a line yields no
/// playable audio. The overall run continues to the next line.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum LineError {
    /// The speech-synthesis request failed at the transport level.
    #[error("Line {line}: speech request failed: {reason}")]
    Transport { line: usize, reason: String },

    /// The response carried none of the known audio fields.
    #[error("Line {line}: unexpected speech response shape (keys: {keys:?})")]
    ShapeUnrecognized { line: usize, keys: Vec<String> },

    /// A known audio field was present but its value was empty.
    #[error("Line {line}: empty audio payload received from the API")]
    EmptyPayload { line: usize },

    /// The payload string decoded as neither hex nor base64.
    #[error("Line {line}: audio payload is neither valid hex nor valid base64")]
    DecodeFailed { line: usize },
}

/// Synthesis failure kinds before a line number is attached.
///
/// [`crate::pipeline::synth::SpeechSynthesizer`] implementations return this;
/// the per-line driver wraps it into a [`LineError`] with the line index.
#[derive(Debug, Clone, Error)]
pub enum SynthError {
    #[error("speech request failed: {0}")]
    Transport(String),

    #[error("unexpected speech response shape (keys: {0:?})")]
    ShapeUnrecognized(Vec<String>),

    #[error("empty audio payload")]
    EmptyPayload,

    #[error("audio payload is neither valid hex nor valid base64")]
    DecodeFailed,
}

impl SynthError {
    /// Attach a 1-indexed line number, producing the storable error.
    pub fn into_line_error(self, line: usize) -> LineError {
        match self {
            SynthError::Transport(reason) => LineError::Transport { line, reason },
            SynthError::ShapeUnrecognized(keys) => LineError::ShapeUnrecognized { line, keys },
            SynthError::EmptyPayload => LineError::EmptyPayload { line },
            SynthError::DecodeFailed => LineError::DecodeFailed { line },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_display_names_env_var() {
        let msg = PodPaperError::MissingApiKey.to_string();
        assert!(msg.contains("MINIMAX_API_KEY"), "got: {msg}");
    }

    #[test]
    fn missing_group_id_display_names_env_var() {
        let msg = PodPaperError::MissingGroupId.to_string();
        assert!(msg.contains("GROUP_ID"), "got: {msg}");
    }

    #[test]
    fn empty_extraction_display() {
        let e = PodPaperError::EmptyExtraction { pages_read: 2 };
        assert!(e.to_string().contains("first 2 page(s)"));
    }

    #[test]
    fn line_error_kinds_are_distinct() {
        let shape = SynthError::ShapeUnrecognized(vec!["unexpected".into()]).into_line_error(3);
        let empty = SynthError::EmptyPayload.into_line_error(3);
        let decode = SynthError::DecodeFailed.into_line_error(3);
        assert!(shape.to_string().contains("unexpected speech response shape"));
        assert!(empty.to_string().contains("empty audio payload"));
        assert!(decode.to_string().contains("neither valid hex nor valid base64"));
    }

    #[test]
    fn transport_line_error_carries_reason() {
        let e = SynthError::Transport("HTTP 503".into()).into_line_error(1);
        let msg = e.to_string();
        assert!(msg.contains("Line 1"));
        assert!(msg.contains("HTTP 503"));
    }
}
