//! Top-level generation entry points.
//!
//! [`generate`] is the canonical path: local PDF in, [`PodcastOutput`] out.
//! [`generate_from_bytes`] and [`generate_from_text`] let embedders enter the
//! pipeline partway — from an already-loaded document or from text they
//! extracted themselves. [`generate_sync`] wraps the async path for callers
//! without a runtime.
//!
//! Credentials are resolved before any document work so a missing key fails
//! in milliseconds, not after a full extraction and script round-trip. The
//! only exception: when both stage clients are injected via config, no
//! credentials are needed at all.

use crate::config::PodcastConfig;
use crate::error::PodPaperError;
use crate::output::{PodcastOutput, PodcastStats, ScriptLine};
use crate::pipeline::script::{MiniMaxScriptClient, ScriptGenerator};
use crate::pipeline::synth::{self, MiniMaxSpeechClient, SpeechSynthesizer};
use crate::pipeline::extract;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Generate a podcast from a local PDF file.
///
/// Reads at most the first `config.max_pages` pages, generates a two-speaker
/// script, then synthesises each line in order. Per-line audio failures do
/// not abort the run; inspect [`PodcastOutput::lines`] for them.
pub async fn generate(
    path: impl AsRef<Path>,
    config: &PodcastConfig,
) -> Result<PodcastOutput, PodPaperError> {
    // Fail on missing credentials before the file is even opened.
    let (generator, synthesizer) = build_clients(config)?;

    let bytes = extract::read_document(path)?;
    let text = extract_nonempty(&bytes, config)?;
    run_pipeline(&text, generator.as_ref(), synthesizer.as_ref(), config).await
}

/// Generate a podcast from in-memory PDF bytes.
pub async fn generate_from_bytes(
    bytes: &[u8],
    config: &PodcastConfig,
) -> Result<PodcastOutput, PodPaperError> {
    // Fail on missing credentials before touching the document.
    let (generator, synthesizer) = build_clients(config)?;

    let text = extract_nonempty(bytes, config)?;
    run_pipeline(&text, generator.as_ref(), synthesizer.as_ref(), config).await
}

/// Extract text, treating an all-blank result as fatal.
fn extract_nonempty(bytes: &[u8], config: &PodcastConfig) -> Result<String, PodPaperError> {
    let text = extract::extract_text(bytes, config.max_pages)?;
    if text.is_empty() {
        return Err(PodPaperError::EmptyExtraction {
            pages_read: config.max_pages,
        });
    }
    Ok(text)
}

/// Generate a podcast from already-extracted text, skipping the PDF stage.
///
/// Empty (after trimming) input is rejected the same way an unreadable
/// document is, so the script stage never sees a blank prompt.
pub async fn generate_from_text(
    source_text: &str,
    config: &PodcastConfig,
) -> Result<PodcastOutput, PodPaperError> {
    let (generator, synthesizer) = build_clients(config)?;

    let text = source_text.trim();
    if text.is_empty() {
        return Err(PodPaperError::EmptyExtraction {
            pages_read: config.max_pages,
        });
    }

    run_pipeline(text, generator.as_ref(), synthesizer.as_ref(), config).await
}

/// Blocking wrapper around [`generate`] for synchronous callers.
pub fn generate_sync(
    path: impl AsRef<Path>,
    config: &PodcastConfig,
) -> Result<PodcastOutput, PodPaperError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| PodPaperError::Internal(format!("failed to create async runtime: {e}")))?;
    runtime.block_on(generate(path, config))
}

/// Resolve the two stage clients, preferring injected implementations.
///
/// Credentials are only resolved when at least one default MiniMax client
/// must be constructed; fully-injected configs run without any.
fn build_clients(
    config: &PodcastConfig,
) -> Result<(Arc<dyn ScriptGenerator>, Arc<dyn SpeechSynthesizer>), PodPaperError> {
    if let (Some(generator), Some(synthesizer)) = (&config.generator, &config.synthesizer) {
        return Ok((Arc::clone(generator), Arc::clone(synthesizer)));
    }

    let credentials = config.resolve_credentials()?;
    // One pooled HTTP client shared across both endpoints.
    let http = reqwest::Client::new();

    let generator: Arc<dyn ScriptGenerator> = match &config.generator {
        Some(g) => Arc::clone(g),
        None => Arc::new(
            MiniMaxScriptClient::new(
                credentials.clone(),
                &config.base_url,
                &config.script_model,
                config.script_timeout_secs,
            )
            .with_client(http.clone()),
        ),
    };

    let synthesizer: Arc<dyn SpeechSynthesizer> = match &config.synthesizer {
        Some(s) => Arc::clone(s),
        None => Arc::new(
            MiniMaxSpeechClient::new(
                credentials,
                &config.base_url,
                &config.speech_model,
                config.audio_timeout_secs,
            )
            .with_client(http),
        ),
    };

    Ok((generator, synthesizer))
}

/// Script stage + sequential synthesis loop.
async fn run_pipeline(
    source_text: &str,
    generator: &dyn ScriptGenerator,
    synthesizer: &dyn SpeechSynthesizer,
    config: &PodcastConfig,
) -> Result<PodcastOutput, PodPaperError> {
    let run_start = Instant::now();

    let script_start = Instant::now();
    let script = generator
        .generate_script(source_text)
        .instrument(info_span!("script_generation"))
        .await?;
    let script_duration = script_start.elapsed();

    if script.is_empty() {
        return Err(PodPaperError::EmptyScript);
    }
    info!(
        "Script ready: {} line(s) in {:?}",
        script.len(),
        script_duration
    );

    if let Some(cb) = &config.progress_callback {
        cb.on_script_ready(script.len());
    }

    let lines = synthesize_script(&script, synthesizer, config).await;

    let synthesized = lines.iter().filter(|l| l.error.is_none()).count();
    let failed = lines.len() - synthesized;
    let total_audio_bytes: u64 = lines.iter().map(|l| l.audio_bytes as u64).sum();
    let synth_duration_ms: u64 = lines.iter().map(|l| l.duration_ms).sum();

    if let Some(cb) = &config.progress_callback {
        cb.on_generation_complete(lines.len(), synthesized);
    }

    let stats = PodcastStats {
        script_lines: script.len(),
        synthesized_lines: synthesized,
        failed_lines: failed,
        total_audio_bytes,
        total_duration_ms: run_start.elapsed().as_millis() as u64,
        script_duration_ms: script_duration.as_millis() as u64,
        synth_duration_ms,
    };
    info!(
        "Generation complete: {}/{} line(s) synthesised, {} audio bytes",
        synthesized,
        lines.len(),
        total_audio_bytes
    );

    Ok(PodcastOutput {
        source_chars: source_text.chars().count(),
        script,
        lines,
        stats,
    })
}

/// Synthesise every line strictly in order, one request at a time.
///
/// Sequential on purpose: ordered progress events, bounded API pressure, and
/// a result vec whose order always matches the script.
async fn synthesize_script(
    script: &[ScriptLine],
    synthesizer: &dyn SpeechSynthesizer,
    config: &PodcastConfig,
) -> Vec<crate::output::LineResult> {
    let total = script.len();
    let mut results = Vec::with_capacity(total);

    for (idx, line) in script.iter().enumerate() {
        let line_num = idx + 1;
        if let Some(cb) = &config.progress_callback {
            cb.on_line_start(line_num, total);
        }

        let result = synth::synthesize_line(synthesizer, line_num, line, config)
            .instrument(info_span!("line_synthesis", line = line_num))
            .await;

        if let Some(cb) = &config.progress_callback {
            match &result.error {
                None => cb.on_line_complete(line_num, total, result.audio_bytes),
                Some(e) => cb.on_line_error(line_num, total, e.to_string()),
            }
        }
        results.push(result);
    }

    results
}
