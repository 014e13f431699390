//! Embedding client configuration.

use std::time::Duration;

/// Default embedding service base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:11434";
/// Default embedding model identifier.
pub const DEFAULT_MODEL: &str = "nomic-embed-text";
/// Default fixed request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Configuration for the embedding client.
///
/// The client never reads the process environment; the composing layer
/// resolves environment overrides once and passes an explicit value here.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Fixed timeout applied to every request.
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
