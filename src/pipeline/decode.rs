//! Audio payload normalisation: locate and decode the encoded-audio string.
//!
//! ## Why is this defensive?
//!
//! The speech API has been observed to return its audio under different field
//! names and in different encodings across versions and configurations. This
//! module degrades gracefully through a priority-ordered list of
//! interpretations instead of assuming one fixed contract:
//!
//! - field location order: `data.audio`, then `audio_file`, then `audio`;
//! - encoding order: hexadecimal, then padded base64, then raw base64.
//!
//! First success wins in both lists. Two interpretations that both "succeed"
//! are never cross-validated; when the winning decode does not start with a
//! recognisable MP3 marker we log a warning but still accept the bytes.

use crate::error::SynthError;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use serde_json::Value;
use tracing::{debug, warn};

/// Locate the encoded-audio string inside a speech API response body.
///
/// Fields are checked in priority order: nested `data.audio`, top-level
/// `audio_file`, top-level `audio`. Returns `ShapeUnrecognized` naming the
/// top-level keys actually observed when none of the three is present, so
/// upstream contract drift is diagnosable from the error alone.
pub fn locate_payload(body: &Value) -> Result<&str, SynthError> {
    if let Some(s) = body.pointer("/data/audio").and_then(Value::as_str) {
        return Ok(s);
    }
    if let Some(s) = body.get("audio_file").and_then(Value::as_str) {
        return Ok(s);
    }
    if let Some(s) = body.get("audio").and_then(Value::as_str) {
        return Ok(s);
    }

    let keys = match body.as_object() {
        Some(map) => map.keys().cloned().collect(),
        None => vec![format!("<non-object: {body}>")],
    };
    Err(SynthError::ShapeUnrecognized(keys))
}

/// Decode an encoded-audio string into raw bytes.
///
/// Interpretations are attempted in priority order:
///
/// 1. hexadecimal — wins immediately on success, even for strings that
///    would also base64-decode to different bytes;
/// 2. base64 with padding normalisation: `padding = 4 - (len % 4)` equals
///    signs are appended when `padding != 4`;
/// 3. raw base64 on the original, unpadded string.
///
/// An empty input returns empty bytes without error (the upstream filter
/// should have prevented the call, but the decoder tolerates it). If all
/// three interpretations fail the result is [`SynthError::DecodeFailed`],
/// distinct from the missing-field and empty-value errors.
pub fn decode_audio(encoded: &str) -> Result<Vec<u8>, SynthError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    // Hex first: the API most often returns hex-encoded audio.
    if let Ok(bytes) = hex::decode(encoded) {
        debug!("audio payload decoded as hex ({} bytes)", bytes.len());
        warn_if_not_mp3(&bytes, "hex");
        return Ok(bytes);
    }

    // Padded base64: upstream sometimes drops the trailing '=' characters.
    let padding = 4 - encoded.len() % 4;
    if padding != 4 {
        let mut padded = String::with_capacity(encoded.len() + padding);
        padded.push_str(encoded);
        padded.extend(std::iter::repeat('=').take(padding));
        if let Ok(bytes) = STANDARD.decode(&padded) {
            debug!("audio payload decoded as padded base64 ({} bytes)", bytes.len());
            warn_if_not_mp3(&bytes, "padded base64");
            return Ok(bytes);
        }
    } else if let Ok(bytes) = STANDARD.decode(encoded) {
        debug!("audio payload decoded as base64 ({} bytes)", bytes.len());
        warn_if_not_mp3(&bytes, "base64");
        return Ok(bytes);
    }

    // Last resort: raw decode of the original string, no padding handling.
    if let Ok(bytes) = STANDARD_NO_PAD.decode(encoded) {
        debug!("audio payload decoded as raw base64 ({} bytes)", bytes.len());
        warn_if_not_mp3(&bytes, "raw base64");
        return Ok(bytes);
    }

    Err(SynthError::DecodeFailed)
}

/// Locate and decode in one step, mapping an empty located value to
/// [`SynthError::EmptyPayload`].
pub fn extract_audio(body: &Value) -> Result<Vec<u8>, SynthError> {
    let payload = locate_payload(body)?;
    if payload.trim().is_empty() {
        return Err(SynthError::EmptyPayload);
    }
    decode_audio(payload)
}

/// True when the bytes begin with an ID3 tag or an MPEG frame sync word.
fn looks_like_mp3(bytes: &[u8]) -> bool {
    bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
}

fn warn_if_not_mp3(bytes: &[u8], interpretation: &str) {
    if !looks_like_mp3(bytes) {
        warn!(
            "decoded audio ({interpretation}, {} bytes) does not start with a known MP3 marker",
            bytes.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── Payload location ─────────────────────────────────────────────────

    #[test]
    fn locates_nested_data_audio_first() {
        let body = json!({
            "data": { "audio": "aa" },
            "audio_file": "bb",
            "audio": "cc",
        });
        assert_eq!(locate_payload(&body).unwrap(), "aa");
    }

    #[test]
    fn falls_back_to_audio_file_then_audio() {
        let body = json!({ "audio_file": "bb", "audio": "cc" });
        assert_eq!(locate_payload(&body).unwrap(), "bb");

        let body = json!({ "audio": "cc" });
        assert_eq!(locate_payload(&body).unwrap(), "cc");
    }

    #[test]
    fn unknown_shape_reports_observed_keys() {
        let body = json!({ "unexpected": "x" });
        let err = locate_payload(&body).unwrap_err();
        match err {
            SynthError::ShapeUnrecognized(keys) => assert_eq!(keys, vec!["unexpected"]),
            other => panic!("expected ShapeUnrecognized, got {other:?}"),
        }
    }

    #[test]
    fn data_without_audio_is_unrecognised() {
        let body = json!({ "data": { "status": 2 } });
        assert!(matches!(
            locate_payload(&body),
            Err(SynthError::ShapeUnrecognized(_))
        ));
    }

    // ── Decoding priority ────────────────────────────────────────────────

    #[test]
    fn hex_wins_over_base64() {
        // "deadbeef" is valid hex AND valid base64; hex must win.
        let bytes = decode_audio("deadbeef").unwrap();
        assert_eq!(bytes, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_ne!(bytes, STANDARD.decode("deadbeef").unwrap());
    }

    #[test]
    fn plain_hex_decodes() {
        assert_eq!(decode_audio("494433").unwrap(), b"ID3");
    }

    #[test]
    fn canonical_base64_decodes() {
        // '!' is not a hex digit, so this can only be base64.
        let encoded = STANDARD.encode(b"not hex!");
        assert_eq!(decode_audio(&encoded).unwrap(), b"not hex!");
    }

    #[test]
    fn unpadded_base64_len_mod_2_gets_two_equals() {
        // "hello" encodes to "aGVsbG8=" — strip the '=' to get len % 4 == 3;
        // use a 4-byte input for len % 4 == 2 instead.
        let full = STANDARD.encode(b"hi there"); // len 12, no padding
        assert_eq!(full.len() % 4, 0);

        let encoded = STANDARD.encode(b"hiya"); // "aGl5YQ==", len 8
        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(unpadded.len() % 4, 2);
        assert_eq!(decode_audio(unpadded).unwrap(), b"hiya");
    }

    #[test]
    fn unpadded_base64_len_mod_3_gets_one_equal() {
        let encoded = STANDARD.encode(b"hello"); // "aGVsbG8="
        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(unpadded.len() % 4, 3);
        assert_eq!(decode_audio(unpadded).unwrap(), b"hello");
    }

    #[test]
    fn empty_input_yields_empty_output_without_error() {
        assert_eq!(decode_audio("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_audio("   ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn garbage_fails_with_decode_error() {
        let err = decode_audio("!!!not-an-encoding!!!").unwrap_err();
        assert!(matches!(err, SynthError::DecodeFailed));
    }

    // ── Combined extraction ──────────────────────────────────────────────

    #[test]
    fn extract_audio_happy_path_hex() {
        let body = json!({ "data": { "audio": "494433040000" } });
        let bytes = extract_audio(&body).unwrap();
        assert!(bytes.starts_with(b"ID3"));
    }

    #[test]
    fn extract_audio_empty_value_is_distinct_error() {
        let body = json!({ "audio": "" });
        assert!(matches!(extract_audio(&body), Err(SynthError::EmptyPayload)));
    }

    #[test]
    fn extract_audio_missing_field_is_distinct_error() {
        let body = json!({ "unexpected": "x" });
        assert!(matches!(
            extract_audio(&body),
            Err(SynthError::ShapeUnrecognized(_))
        ));
    }

    // ── MP3 sniffing ─────────────────────────────────────────────────────

    #[test]
    fn mp3_markers_recognised() {
        assert!(looks_like_mp3(b"ID3\x04\x00"));
        assert!(looks_like_mp3(&[0xFF, 0xFB, 0x90]));
        assert!(!looks_like_mp3(b"RIFF"));
        assert!(!looks_like_mp3(&[]));
    }
}
