//! Session-scoped conversation context persistence for Mneme.

pub mod error;
pub mod model;
pub mod path;
pub mod store;

/// Context store error type.
pub use error::ContextStoreError;
/// Persisted context model.
pub use model::{CREATED_AT_KEY, Context, ContextSummary, Message, Role, UPDATED_AT_KEY};
/// Identifier sanitization helpers.
pub use path::{record_stem, sanitize_session_id};
/// File-backed store.
pub use store::ContextStore;
