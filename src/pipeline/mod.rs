//! The podcast generation pipeline.
//!
//! Three sequential stages, each with a hard boundary:
//!
//! ```text
//! PDF bytes ──▶ extract ──▶ source text
//!                              │
//!                              ▼
//!                           script ──▶ ordered Host/Guest lines
//!                              │
//!                              ▼  (one line at a time)
//!                           synth ──▶ decode ──▶ audio bytes per line
//! ```
//!
//! Failure semantics differ by stage: extraction and script failures are
//! fatal to the run; synthesis and decoding failures are isolated to the
//! line that caused them. [`crate::generate`] drives the stages.

pub mod decode;
pub mod extract;
pub mod script;
pub mod synth;
