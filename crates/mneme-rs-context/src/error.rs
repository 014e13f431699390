//! Error types for context store operations.

/// Errors returned by the context store.
#[derive(Debug, thiserror::Error)]
pub enum ContextStoreError {
    /// Empty session identifier supplied to a mutating operation.
    #[error("session id must not be empty")]
    EmptySessionId,
    /// IO error from the backing storage.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted record exists but cannot be parsed.
    #[error("corrupt context record: {0}")]
    Corrupt(serde_json::Error),
    /// Serialization error on the write path.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
