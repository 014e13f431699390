//! Session identifier to storage location mapping.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// File extension for persisted context records.
pub const RECORD_EXTENSION: &str = "json";

/// Maximum length of the sanitized prefix in a record stem.
const MAX_STEM_PREFIX: usize = 64;

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_session_id(session_id: &str) -> String {
    session_id
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Stable on-disk stem for a session identifier.
///
/// The sanitized prefix keeps stems readable; the digest suffix keeps
/// distinct identifiers from sharing a stem after sanitization collapses
/// characters or the prefix is truncated to fit filesystem name limits.
pub fn record_stem(session_id: &str) -> String {
    let mut prefix = sanitize_session_id(session_id);
    prefix.truncate(MAX_STEM_PREFIX);
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{prefix}-{}", &digest[..16])
}

/// Build the record file path for a session under the given root.
pub fn record_path(root: &Path, session_id: &str) -> PathBuf {
    root.join(format!("{}.{RECORD_EXTENSION}", record_stem(session_id)))
}
