//! Public SDK surface for Mneme.
//!
//! This crate re-exports the core building blocks and provides the one
//! place where process environment is consulted for configuration, so the
//! components themselves stay pure and testable.

use log::warn;
use mneme_rs_embedding::EmbeddingConfig;
use std::time::Duration;

/// Re-export for convenience.
pub use mneme_rs_context as context;
/// Re-export for convenience.
pub use mneme_rs_embedding as embedding;

/// Environment variable overriding the embedding service base URL.
pub const ENV_EMBEDDING_API_URL: &str = "MNEME_EMBEDDING_API_URL";
/// Environment variable overriding the embedding model.
pub const ENV_EMBEDDING_MODEL: &str = "MNEME_EMBEDDING_MODEL";
/// Environment variable overriding the request timeout in milliseconds.
pub const ENV_EMBEDDING_TIMEOUT_MS: &str = "MNEME_EMBEDDING_TIMEOUT_MS";

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Build an embedding config from an injectable variable lookup.
///
/// Set variables override the built-in defaults; unset ones leave them in
/// place. An unparseable timeout keeps the default and logs a warning.
pub fn resolve_embedding_config(
    lookup: impl Fn(&str) -> Option<String>,
) -> EmbeddingConfig {
    let mut config = EmbeddingConfig::default();
    if let Some(api_url) = lookup(ENV_EMBEDDING_API_URL) {
        config.api_url = api_url;
    }
    if let Some(model) = lookup(ENV_EMBEDDING_MODEL) {
        config.model = model;
    }
    if let Some(raw) = lookup(ENV_EMBEDDING_TIMEOUT_MS) {
        match raw.parse::<u64>() {
            Ok(millis) => config.timeout = Duration::from_millis(millis),
            Err(_) => warn!("ignoring unparseable embedding timeout (value={raw})"),
        }
    }
    config
}

/// Build an embedding config from the process environment.
pub fn embedding_config_from_env() -> EmbeddingConfig {
    resolve_embedding_config(|key| std::env::var(key).ok())
}
