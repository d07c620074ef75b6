//! PDF → plain text.

use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

/// Below this many characters the upload is treated as a scanned or empty document.
pub const MIN_EXTRACTED_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Could not read text from the PDF: {0}")]
    Unreadable(String),

    #[error("Could not extract enough text from the PDF ({0} characters)")]
    InsufficientText(usize),
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::Empty => AppError::Validation(err.to_string()),
            other => AppError::UnprocessableEntity(other.to_string()),
        }
    }
}

/// Extracts the text layer of a PDF. CPU-bound; call from `spawn_blocking`.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    if bytes.is_empty() {
        return Err(PdfError::Empty);
    }

    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PdfError::Unreadable(e.to_string()))?;
    let text = collapse_whitespace(&raw);

    let chars = text.chars().count();
    debug!(bytes = bytes.len(), chars, "extracted PDF text");
    if chars < MIN_EXTRACTED_CHARS {
        return Err(PdfError::InsufficientText(chars));
    }
    Ok(text)
}

/// Joins lines, dropping the blank runs PDF text layers are full of.
fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
