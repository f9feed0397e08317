//! Text extraction: a bounded page prefix of the PDF → plain text.
//!
//! Only the first `max_pages` pages (default 2) are ever read — enough
//! source material for a short dialogue without blowing the model's context
//! window. Pages are joined with a newline; a page with no extractable text
//! contributes nothing; the result is trimmed. Whole-document failure is
//! fatal: the pipeline halts rather than proceeding with garbage input.

use crate::error::PodPaperError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read a PDF from disk, validating existence and the `%PDF` magic bytes.
///
/// Validating the magic up front gives callers a meaningful error instead of
/// an opaque parser failure on, say, an HTML error page saved as `.pdf`.
pub fn read_document(path: impl AsRef<Path>) -> Result<Vec<u8>, PodPaperError> {
    let path = path.as_ref();

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PodPaperError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PodPaperError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| PodPaperError::Internal(format!("read failed: {e}")))?;

    if bytes.len() >= 4 && &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PodPaperError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Extract text from at most the first `max_pages` pages of a PDF.
///
/// Returns the concatenated visible text, pages joined by a newline, trimmed
/// of leading/trailing whitespace. An all-blank document yields `Ok("")` —
/// the caller decides that this halts the run (with a distinct
/// "no usable text" message rather than a parse error).
pub fn extract_text(bytes: &[u8], max_pages: usize) -> Result<String, PodPaperError> {
    // pdf-extract panics on some malformed documents instead of returning
    // Err; contain that so corrupt input surfaces as ExtractionFailed.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| PodPaperError::ExtractionFailed {
            detail: "document parser panicked on malformed input".to_string(),
        })?
        .map_err(|e| PodPaperError::ExtractionFailed {
            detail: e.to_string(),
        })?;

    let text = assemble_pages(&pages, max_pages);
    info!(
        "Extracted {} chars from first {} of {} page(s)",
        text.len(),
        max_pages.min(pages.len()),
        pages.len()
    );
    Ok(text)
}

/// Join the first `max_pages` non-blank pages with a newline and trim.
fn assemble_pages(pages: &[String], max_pages: usize) -> String {
    pages
        .iter()
        .take(max_pages)
        .map(|p| p.trim_end())
        .filter(|p| !p.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Resolve a local path to extracted text in one step.
pub fn extract_from_path(
    path: impl AsRef<Path>,
    max_pages: usize,
) -> Result<String, PodPaperError> {
    let bytes = read_document(path)?;
    extract_text(&bytes, max_pages)
}

/// Helper used by the CLI to derive a default output directory name.
pub fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "podcast".to_string());
    PathBuf::from(format!("{stem}_podcast"))
}
