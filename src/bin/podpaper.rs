//! CLI binary for podpaper.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PodcastConfig`, runs the pipeline, and writes one MP3 per script line.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use podpaper::{
    generate, GenerationProgressCallback, PodcastConfig, PodcastOutput, ProgressCallback, Speaker,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per script line.
/// Lines are synthesised sequentially, so events always arrive in order.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Bar length is set dynamically by `on_script_ready` (called once the
    /// script is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scripting");
        bar.set_message("Generating dialogue…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} lines  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Voicing");
        self.bar.reset_eta();
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_script_ready(&self, line_count: usize) {
        self.activate_bar(line_count);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Script ready: {line_count} lines…"))
        ));
    }

    fn on_line_start(&self, line_num: usize, _total: usize) {
        self.bar.set_message(format!("line {line_num}"));
    }

    fn on_line_complete(&self, line_num: usize, total: usize, audio_bytes: usize) {
        self.bar.println(format!(
            "  {} Line {:>3}/{:<3}  {}",
            green("✓"),
            line_num,
            total,
            dim(&format!("{audio_bytes:>7} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_line_error(&self, line_num: usize, total: usize, error: String) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = truncate_message(&error);

        self.bar.println(format!(
            "  {} Line {:>3}/{:<3}  {}",
            red("✗"),
            line_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_lines: usize, success_count: usize) {
        let failed = total_lines.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} lines voiced successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} lines voiced  ({} failed)",
                if failed == total_lines {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_lines,
                red(&failed.to_string()),
            );
        }
    }
}

/// Cap a message at 80 bytes, cutting on a char boundary. Error text can
/// carry non-ASCII (upstream error strings, response keys), so a byte slice
/// at a fixed index would panic mid-character.
fn truncate_message(s: &str) -> String {
    const MAX: usize = 80;
    if s.len() <= MAX {
        return s.to_string();
    }
    let mut cut = MAX - 1;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\u{2026}", &s[..cut])
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic run: script + one MP3 per line in ./paper_podcast/
  podpaper paper.pdf

  # Choose the output directory
  podpaper paper.pdf -o episodes/attention

  # Script only, no audio synthesis
  podpaper --script-only paper.pdf

  # Different voices
  podpaper --host-voice presenter_male --guest-voice audiobook_female_1 paper.pdf

  # Structured JSON report (script, per-line status, stats) on stdout
  podpaper --json paper.pdf > run.json

OUTPUT LAYOUT:
  <out-dir>/line-01-host.mp3
  <out-dir>/line-02-guest.mp3
  ...
  One file per successfully synthesised line, numbered in script order.
  Failed lines are reported but produce no file; the run still succeeds
  as long as the script itself was generated.

ENVIRONMENT VARIABLES:
  MINIMAX_API_KEY   MiniMax API key (required unless --api-key is given)
  GROUP_ID          MiniMax group/tenant ID (required unless --group-id)

SETUP:
  1. Set credentials:  export MINIMAX_API_KEY=...  GROUP_ID=...
  2. Run:              podpaper paper.pdf
"#;

/// Turn a PDF paper into a two-speaker podcast.
#[derive(Parser, Debug)]
#[command(
    name = "podpaper",
    version,
    about = "Turn a PDF paper into a two-speaker podcast using MiniMax",
    long_about = "Extract the first pages of a PDF document, generate a Host/Guest podcast \
script with the MiniMax chat-completion API, then synthesise each line to MP3 with the \
MiniMax text-to-audio API.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory for the per-line MP3 files. Default: <input-stem>_podcast/.
    #[arg(short, long, env = "PODPAPER_OUTPUT")]
    output: Option<PathBuf>,

    /// MiniMax API key (overrides MINIMAX_API_KEY).
    #[arg(long, env = "MINIMAX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// MiniMax group/tenant ID (overrides GROUP_ID).
    #[arg(long, env = "GROUP_ID")]
    group_id: Option<String>,

    /// Chat-completion model for script generation.
    #[arg(long, env = "PODPAPER_MODEL", default_value = podpaper::DEFAULT_SCRIPT_MODEL)]
    model: String,

    /// Speech-synthesis model.
    #[arg(long, env = "PODPAPER_SPEECH_MODEL", default_value = podpaper::DEFAULT_SPEECH_MODEL)]
    speech_model: String,

    /// Voice profile for the Host role.
    #[arg(long, env = "PODPAPER_HOST_VOICE", default_value = podpaper::HOST_VOICE_ID)]
    host_voice: String,

    /// Voice profile for the Guest role.
    #[arg(long, env = "PODPAPER_GUEST_VOICE", default_value = podpaper::GUEST_VOICE_ID)]
    guest_voice: String,

    /// Maximum number of leading pages to read from the document.
    #[arg(long, env = "PODPAPER_MAX_PAGES", default_value_t = 2)]
    max_pages: usize,

    /// Script request timeout in seconds.
    #[arg(long, env = "PODPAPER_SCRIPT_TIMEOUT", default_value_t = 60)]
    script_timeout: u64,

    /// Per-line speech request timeout in seconds.
    #[arg(long, env = "PODPAPER_AUDIO_TIMEOUT", default_value_t = 120)]
    audio_timeout: u64,

    /// Base URL for both MiniMax APIs (proxies, compatible endpoints).
    #[arg(long, env = "PODPAPER_BASE_URL", default_value = podpaper::DEFAULT_BASE_URL)]
    base_url: String,

    /// Print the generated script and exit without synthesising audio.
    #[arg(long)]
    script_only: bool,

    /// Output a structured JSON report instead of the human-readable summary.
    #[arg(long, env = "PODPAPER_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PODPAPER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PODPAPER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PODPAPER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.script_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Script-only mode ─────────────────────────────────────────────────
    if cli.script_only {
        let text =
            podpaper::pipeline::extract::extract_from_path(&cli.input, config.max_pages)
                .context("Text extraction failed")?;
        if text.is_empty() {
            anyhow::bail!(
                "No extractable text in the first {} page(s) of the document",
                config.max_pages
            );
        }

        let credentials = config.resolve_credentials()?;
        let client = podpaper::MiniMaxScriptClient::new(
            credentials,
            &config.base_url,
            &config.script_model,
            config.script_timeout_secs,
        );
        use podpaper::ScriptGenerator as _;
        let script = client
            .generate_script(&text)
            .await
            .context("Script generation failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&script).context("Failed to serialise script")?
            );
        } else {
            for line in &script {
                println!("{}: {}", bold(&line.speaker.to_string()), line.text);
            }
        }
        return Ok(());
    }

    // ── Full run ─────────────────────────────────────────────────────────
    let output = generate(&cli.input, &config)
        .await
        .context("Podcast generation failed")?;

    let out_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| podpaper::pipeline::extract::default_output_dir(&cli.input));
    let written = write_audio_files(&output, &out_dir)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&output, written, &out_dir);
    }

    // A run with zero playable lines is a failure from the CLI's viewpoint
    // even though the library reports partial results.
    if output.stats.synthesized_lines == 0 {
        anyhow::bail!("No lines produced playable audio");
    }

    Ok(())
}

/// Map CLI args to `PodcastConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PodcastConfig> {
    let mut builder = PodcastConfig::builder()
        .base_url(&cli.base_url)
        .script_model(&cli.model)
        .speech_model(&cli.speech_model)
        .host_voice(&cli.host_voice)
        .guest_voice(&cli.guest_voice)
        .max_pages(cli.max_pages)
        .script_timeout_secs(cli.script_timeout)
        .audio_timeout_secs(cli.audio_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref group) = cli.group_id {
        builder = builder.group_id(group);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write one MP3 per playable line; returns the number of files written.
fn write_audio_files(output: &PodcastOutput, out_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written = 0;
    for line in output.playable_lines() {
        let speaker = match line.speaker {
            Speaker::Host => "host",
            Speaker::Guest => "guest",
        };
        let path = out_dir.join(format!("line-{:02}-{speaker}.mp3", line.line_num));
        std::fs::write(&path, &line.audio)
            .with_context(|| format!("Failed to write audio file {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

fn print_summary(output: &PodcastOutput, written: usize, out_dir: &Path) {
    println!();
    for line in &output.script {
        println!("{}: {}", bold(&line.speaker.to_string()), line.text);
    }
    println!();

    let s = &output.stats;
    eprintln!(
        "{}  {}/{} lines  {} audio bytes  {}ms  →  {}",
        if s.failed_lines == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        s.synthesized_lines,
        s.script_lines,
        s.total_audio_bytes,
        s.total_duration_ms,
        bold(&out_dir.display().to_string()),
    );
    eprintln!(
        "   {} file(s) written  {}",
        written,
        dim(&format!(
            "(script {}ms, audio {}ms)",
            s.script_duration_ms, s.synth_duration_ms
        ))
    );
    for line in output.lines.iter().filter(|l| l.error.is_some()) {
        if let Some(ref e) = line.error {
            eprintln!("   {} {}", red("✗"), e);
        }
    }
}
