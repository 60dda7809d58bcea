use std::sync::Arc;

use crate::config::Config;
use crate::extractor::TextExtractor;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Nothing in here is mutated after startup; every request works on its own data.
#[derive(Clone)]
pub struct AppState {
    /// Resume text extractor. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    /// Model client. Default: `GeminiClient`, built from `config`.
    pub llm: Arc<dyn CompletionClient>,
    pub config: Config,
}
