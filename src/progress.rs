//! Progress-callback trait for per-line generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::PodcastConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the script.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a WebSocket, or a log sink
//! without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so it composes with async
//! callers even though lines are processed strictly one at a time.

use std::sync::Arc;

/// Called by the pipeline as it processes a run.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Lines are synthesised sequentially, so events for a
/// given run arrive in order.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called once after the script has been generated and filtered.
    ///
    /// # Arguments
    /// * `line_count` — number of lines that will be synthesised
    fn on_script_ready(&self, line_count: usize) {
        let _ = line_count;
    }

    /// Called just before the speech request is sent for a line.
    fn on_line_start(&self, line_num: usize, total_lines: usize) {
        let _ = (line_num, total_lines);
    }

    /// Called when a line's audio was decoded successfully.
    ///
    /// # Arguments
    /// * `audio_bytes` — decoded length, useful for progress displays
    fn on_line_complete(&self, line_num: usize, total_lines: usize, audio_bytes: usize) {
        let _ = (line_num, total_lines, audio_bytes);
    }

    /// Called when a line yielded no playable audio. The run continues.
    fn on_line_error(&self, line_num: usize, total_lines: usize, error: String) {
        let _ = (line_num, total_lines, error);
    }

    /// Called once after every line has been attempted.
    fn on_generation_complete(&self, total_lines: usize, success_count: usize) {
        let _ = (total_lines, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PodcastConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
