//! End-to-end integration tests for podpaper.
//!
//! Most tests here inject stub implementations of the two stage traits, so
//! they run offline and in CI. The live-API tests at the bottom are gated
//! behind the `E2E_ENABLED` environment variable (plus credentials) and make
//! real MiniMax calls.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture
//!
//! To include the live tests:
//!   E2E_ENABLED=1 MINIMAX_API_KEY=... GROUP_ID=... cargo test --test e2e -- --nocapture

use async_trait::async_trait;
use podpaper::{
    generate_from_text, GenerationProgressCallback, PodPaperError, PodcastConfig, ScriptGenerator,
    ScriptLine, Speaker, SpeechSynthesizer, SynthError,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Stub implementations ─────────────────────────────────────────────────────

struct StubGenerator {
    script: Vec<ScriptLine>,
}

#[async_trait]
impl ScriptGenerator for StubGenerator {
    async fn generate_script(&self, _text: &str) -> Result<Vec<ScriptLine>, PodPaperError> {
        Ok(self.script.clone())
    }
}

/// Synthesizer that returns distinct bytes per call, with a controllable set
/// of failing line texts.
struct StubSynth {
    failing_texts: Vec<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubSynth {
    fn ok() -> Self {
        Self {
            failing_texts: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(text: &str) -> Self {
        Self {
            failing_texts: vec![text.to_string()],
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for StubSynth {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SynthError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_id.to_string()));
        if self.failing_texts.iter().any(|t| t == text) {
            return Err(SynthError::DecodeFailed);
        }
        // Distinct bytes per utterance so ordering mix-ups are detectable.
        Ok(format!("AUDIO:{text}").into_bytes())
    }
}

fn sample_script() -> Vec<ScriptLine> {
    vec![
        ScriptLine {
            speaker: Speaker::Host,
            text: "Welcome!".into(),
        },
        ScriptLine {
            speaker: Speaker::Guest,
            text: "Skies are blue today.".into(),
        },
    ]
}

fn stub_config(generator: StubGenerator, synth: Arc<StubSynth>) -> PodcastConfig {
    PodcastConfig::builder()
        .generator(Arc::new(generator))
        .synthesizer(synth)
        .build()
        .expect("valid config")
}

// ── Offline pipeline tests (always run) ──────────────────────────────────────

#[tokio::test]
async fn test_two_line_script_yields_two_artifacts_in_order() {
    let synth = Arc::new(StubSynth::ok());
    let config = stub_config(
        StubGenerator {
            script: sample_script(),
        },
        Arc::clone(&synth),
    );

    let output = generate_from_text("A short paper about the sky.", &config)
        .await
        .expect("generation should succeed");

    assert_eq!(output.lines.len(), 2, "one artifact per script line");
    assert_eq!(output.lines[0].audio, b"AUDIO:Welcome!");
    assert_eq!(output.lines[1].audio, b"AUDIO:Skies are blue today.");
    assert_eq!(output.stats.synthesized_lines, 2);
    assert_eq!(output.stats.failed_lines, 0);

    // Host line must get the host voice, guest line the guest voice.
    let calls = synth.calls.lock().unwrap().clone();
    assert_eq!(calls[0].1, podpaper::HOST_VOICE_ID);
    assert_eq!(calls[1].1, podpaper::GUEST_VOICE_ID);
}

#[tokio::test]
async fn test_one_failing_line_does_not_abort_the_run() {
    let synth = Arc::new(StubSynth::failing_on("Welcome!"));
    let config = stub_config(
        StubGenerator {
            script: sample_script(),
        },
        Arc::clone(&synth),
    );

    let output = generate_from_text("Source text.", &config)
        .await
        .expect("a single bad line must not fail the run");

    assert_eq!(output.lines.len(), 2, "failed line still gets a result slot");
    assert!(output.lines[0].error.is_some());
    assert!(output.lines[0].audio.is_empty());
    assert!(output.lines[1].error.is_none());
    assert_eq!(output.stats.synthesized_lines, 1);
    assert_eq!(output.stats.failed_lines, 1);

    // Both lines were attempted: failure on line 1 did not halt line 2.
    assert_eq!(synth.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_script_is_fatal() {
    let config = stub_config(
        StubGenerator { script: Vec::new() },
        Arc::new(StubSynth::ok()),
    );

    let err = generate_from_text("Source text.", &config)
        .await
        .expect_err("empty script must halt the run");
    assert!(matches!(err, PodPaperError::EmptyScript));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_processing() {
    // No injected clients, no api_key/group_id, env vars unset for this name.
    let config = PodcastConfig::builder()
        .build()
        .expect("default config builds");

    if std::env::var("MINIMAX_API_KEY").is_ok() {
        println!("SKIP — MINIMAX_API_KEY is set in this environment");
        return;
    }

    let err = generate_from_text("Source text.", &config)
        .await
        .expect_err("missing credentials must be fatal");
    assert!(matches!(err, PodPaperError::MissingApiKey));
}

#[tokio::test]
async fn test_custom_voices_are_used() {
    let synth = Arc::new(StubSynth::ok());
    let config = PodcastConfig::builder()
        .generator(Arc::new(StubGenerator {
            script: sample_script(),
        }))
        .synthesizer(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>)
        .host_voice("presenter_male")
        .guest_voice("audiobook_female_1")
        .build()
        .expect("valid config");

    generate_from_text("Source.", &config)
        .await
        .expect("generation should succeed");

    let calls = synth.calls.lock().unwrap().clone();
    assert_eq!(calls[0].1, "presenter_male");
    assert_eq!(calls[1].1, "audiobook_female_1");
}

#[tokio::test]
async fn test_progress_callbacks_fire_in_order() {
    struct TestCallback {
        script_ready: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        final_successes: AtomicUsize,
    }

    impl GenerationProgressCallback for TestCallback {
        fn on_script_ready(&self, line_count: usize) {
            self.script_ready.store(line_count, Ordering::SeqCst);
        }
        fn on_line_start(&self, _line: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn on_line_complete(&self, _line: usize, _total: usize, _bytes: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_line_error(&self, _line: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
        fn on_generation_complete(&self, _total: usize, success_count: usize) {
            self.final_successes.store(success_count, Ordering::SeqCst);
        }
    }

    let cb = Arc::new(TestCallback {
        script_ready: AtomicUsize::new(0),
        starts: AtomicUsize::new(0),
        completes: AtomicUsize::new(0),
        errors: AtomicUsize::new(0),
        final_successes: AtomicUsize::new(0),
    });

    let config = PodcastConfig::builder()
        .generator(Arc::new(StubGenerator {
            script: sample_script(),
        }))
        .synthesizer(Arc::new(StubSynth::failing_on("Welcome!")))
        .progress_callback(Arc::clone(&cb) as Arc<dyn GenerationProgressCallback>)
        .build()
        .expect("valid config");

    generate_from_text("Source.", &config)
        .await
        .expect("generation should succeed");

    assert_eq!(cb.script_ready.load(Ordering::SeqCst), 2);
    assert_eq!(cb.starts.load(Ordering::SeqCst), 2);
    assert_eq!(cb.completes.load(Ordering::SeqCst), 1);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
    assert_eq!(cb.final_successes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_output_serialises_without_raw_audio() {
    let config = stub_config(
        StubGenerator {
            script: sample_script(),
        },
        Arc::new(StubSynth::ok()),
    );

    let output = generate_from_text("Source.", &config)
        .await
        .expect("generation should succeed");

    let json = serde_json::to_string_pretty(&output).expect("output must serialise to JSON");
    assert!(
        !json.contains("AUDIO:"),
        "raw audio bytes must never end up in the JSON report"
    );
    assert!(json.contains("\"audio_bytes\""));

    let back: podpaper::PodcastOutput =
        serde_json::from_str(&json).expect("JSON must deserialise back");
    assert_eq!(back.stats.script_lines, output.stats.script_lines);
}

#[tokio::test]
async fn test_callback_send_in_tokio_spawn() {
    struct ErrorLogger {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl GenerationProgressCallback for ErrorLogger {
        fn on_line_error(&self, _line: usize, _total: usize, error: String) {
            self.log.lock().unwrap().push(error);
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let cb: Arc<dyn GenerationProgressCallback> = Arc::new(ErrorLogger {
        log: Arc::clone(&log),
    });

    // Moving `cb` into tokio::spawn requires the future to be Send.
    tokio::spawn(async move {
        cb.on_line_error(2, 5, "empty audio payload".to_string());
    })
    .await
    .expect("spawn must succeed");

    assert_eq!(log.lock().unwrap().clone(), vec!["empty audio payload"]);
}

// ── Live MiniMax tests (gated) ───────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip unless E2E_ENABLED is set and MiniMax credentials are present.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run live e2e tests");
            return;
        }
        if std::env::var("MINIMAX_API_KEY").is_err() || std::env::var("GROUP_ID").is_err() {
            println!("SKIP — MINIMAX_API_KEY and GROUP_ID must be set");
            return;
        }
    }};
}

/// Live: generate a script (no audio) from fixed text.
#[tokio::test]
async fn test_live_script_generation() {
    e2e_skip_unless_ready!();

    let config = PodcastConfig::builder().build().expect("valid config");
    let credentials = config.resolve_credentials().expect("credentials present");
    let client = podpaper::MiniMaxScriptClient::new(
        credentials,
        &config.base_url,
        &config.script_model,
        config.script_timeout_secs,
    );

    let script = client
        .generate_script("Photosynthesis converts sunlight, water, and carbon dioxide into glucose and oxygen inside chloroplasts.")
        .await
        .expect("live script generation should succeed");

    assert!(!script.is_empty(), "model should produce at least one line");
    assert!(
        script.iter().any(|l| l.speaker == Speaker::Host),
        "a podcast script needs a Host"
    );
    for line in &script {
        println!("{}: {}", line.speaker, line.text);
    }
}

/// Live: full PDF → podcast run against the real APIs.
#[tokio::test]
async fn test_live_full_run_from_pdf() {
    e2e_skip_unless_ready!();

    let pdf_path = test_cases_dir().join("sample_paper.pdf");
    if !pdf_path.exists() {
        println!("SKIP — test file not found: {}", pdf_path.display());
        return;
    }

    let config = PodcastConfig::builder().build().expect("valid config");
    let output = podpaper::generate(&pdf_path, &config)
        .await
        .expect("live run should succeed");

    assert!(output.stats.script_lines > 0);
    assert!(
        output.stats.synthesized_lines > 0,
        "at least one line should produce playable audio"
    );
    for line in output.playable_lines() {
        assert!(!line.audio.is_empty());
        println!(
            "[live] line {} ({}): {} bytes",
            line.line_num, line.speaker, line.audio_bytes
        );
    }
}
