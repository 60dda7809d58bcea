//! Plain-text extraction from uploaded resume documents.
//!
//! Extraction is CPU-bound and the PDF parser is not panic-free on hostile
//! input, so callers run it through [`extract_blocking`] on the blocking pool.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Document is not a readable PDF: {0}")]
    InvalidPdf(String),

    #[error("Text extraction aborted: {0}")]
    Aborted(String),
}

/// Turns raw document bytes into plain text.
///
/// Carried in `AppState` as `Arc<dyn TextExtractor>` so router tests can
/// substitute a canned extractor.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError>;
}

/// PDF extractor backed by `pdf-extract`.
///
/// Pages are concatenated in document order and the result is trimmed.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<String, ExtractError> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| ExtractError::InvalidPdf(e.to_string()))?;

        debug!("Extracted {} characters from PDF", text.chars().count());

        Ok(text.trim().to_string())
    }
}

/// Runs `extractor` on the blocking thread pool.
/// A panic inside the extractor surfaces as [`ExtractError::Aborted`].
pub async fn extract_blocking(
    extractor: Arc<dyn TextExtractor>,
    data: Bytes,
) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extractor.extract(&data))
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))?
}
