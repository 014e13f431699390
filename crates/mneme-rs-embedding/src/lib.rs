//! Remote embedding generation client for Mneme.

pub mod client;
pub mod config;
pub mod error;

/// Embedding client and dimensionality.
pub use client::{EMBEDDING_DIMENSIONS, EmbeddingClient};
/// Client configuration and defaults.
pub use config::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, EmbeddingConfig};
/// Embedding error type.
pub use error::EmbeddingError;
