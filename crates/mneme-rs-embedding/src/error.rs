//! Error types for embedding requests.

/// Errors returned by the embedding client.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Connection refused or request timeout.
    #[error("embedding service unreachable: {0}")]
    Connectivity(String),
    /// Non-success status or other transport failure.
    #[error("embedding api error: {0}")]
    Api(String),
    /// Response body lacking the expected embedding vector.
    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),
}
