//! File-backed context store with per-session mutation serialization.

use crate::error::ContextStoreError;
use crate::model::{CREATED_AT_KEY, Context, ContextSummary, Message, UPDATED_AT_KEY};
use crate::path::{RECORD_EXTENSION, record_path, record_stem};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as SessionMutex;

/// Prune released session locks once the map grows past this many entries.
const LOCK_PRUNE_THRESHOLD: usize = 128;

/// Durable, session-isolated store for conversation contexts.
///
/// One JSON record per session under the root directory. Mutations on the
/// same session are serialized through a per-location lock so concurrent
/// appends never overwrite each other; a save that acquires the lock
/// replaces the record outright, including over queued earlier appends.
/// Reads take no lock and rely on atomic record replacement.
pub struct ContextStore {
    /// Root directory for context records.
    root: PathBuf,
    /// One mutual-exclusion unit per sanitized location, created on demand.
    locks: parking_lot::Mutex<HashMap<String, Arc<SessionMutex<()>>>>,
}

impl ContextStore {
    /// Create a store under the given root, creating the directory tree.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ContextStoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized context store (root={})", root.display());
        Ok(Self {
            root,
            locks: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    /// Fully replace the persisted state for a session.
    ///
    /// The `session_id` argument wins over the one carried in `context`.
    /// Refreshes `updatedAt`; sets `createdAt` only when the incoming
    /// record lacks it.
    pub async fn save_context(
        &self,
        session_id: &str,
        mut context: Context,
    ) -> Result<(), ContextStoreError> {
        if session_id.is_empty() {
            return Err(ContextStoreError::EmptySessionId);
        }
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        if context.session_id != session_id {
            warn!(
                "context session id mismatch, store key wins (session_id={}, context={})",
                session_id, context.session_id
            );
            context.session_id = session_id.to_string();
        }
        context.touch();
        debug!(
            "saving context (session_id={}, messages={})",
            session_id,
            context.messages.len()
        );
        self.write_record(session_id, &context).await
    }

    /// Load the context for a session.
    ///
    /// Returns `None` when no record exists; a record that exists but does
    /// not parse is a [`ContextStoreError::Corrupt`] error, never `None`.
    pub async fn get_context(
        &self,
        session_id: &str,
    ) -> Result<Option<Context>, ContextStoreError> {
        let path = record_path(&self.root, session_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let context = serde_json::from_slice(&bytes).map_err(ContextStoreError::Corrupt)?;
        Ok(Some(context))
    }

    /// Append one message to a session, creating the session if needed.
    ///
    /// The read-modify-write runs under the session's exclusive lock, so N
    /// concurrent appends land as exactly N messages in arrival order at
    /// the lock.
    pub async fn add_message(
        &self,
        session_id: &str,
        message: Message,
    ) -> Result<(), ContextStoreError> {
        if session_id.is_empty() {
            return Err(ContextStoreError::EmptySessionId);
        }
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let mut context = self
            .get_context(session_id)
            .await?
            .unwrap_or_else(|| Context::new(session_id));
        debug!(
            "appending message (session_id={}, role={}, content_len={})",
            session_id,
            message.role,
            message.content.len()
        );
        context.messages.push(message);
        context.touch();
        self.write_record(session_id, &context).await
    }

    /// Delete the record for a session.
    ///
    /// Returns `true` when a record was removed, `false` when none existed.
    pub async fn delete_context(&self, session_id: &str) -> Result<bool, ContextStoreError> {
        if session_id.is_empty() {
            return Err(ContextStoreError::EmptySessionId);
        }
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let path = record_path(&self.root, session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("deleted context record (session_id={session_id})");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("context record not found (session_id={session_id})");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// List summaries for all persisted contexts, most recently updated
    /// first. A corrupt record fails the listing.
    pub async fn list_contexts(&self) -> Result<Vec<ContextSummary>, ContextStoreError> {
        let mut summaries = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            let context: Context =
                serde_json::from_slice(&bytes).map_err(ContextStoreError::Corrupt)?;
            summaries.push(summarize(&context));
        }
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Get or create the lock guarding a session's sanitized location.
    fn session_lock(&self, session_id: &str) -> Arc<SessionMutex<()>> {
        let stem = record_stem(session_id);
        let mut locks = self.locks.lock();
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(stem)
            .or_insert_with(|| Arc::new(SessionMutex::new(())))
            .clone()
    }

    /// Persist a record atomically: write a temporary file, then rename
    /// over any existing record so readers only ever see a complete
    /// document.
    async fn write_record(
        &self,
        session_id: &str,
        context: &Context,
    ) -> Result<(), ContextStoreError> {
        let path = record_path(&self.root, session_id);
        let temp_path = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));
        let body = serde_json::to_vec(context)?;
        tokio::fs::write(&temp_path, &body).await?;
        tokio::fs::rename(&temp_path, &path).await?;
        Ok(())
    }
}

/// Build a listing summary from a loaded context.
fn summarize(context: &Context) -> ContextSummary {
    let created_at = context
        .timestamp(CREATED_AT_KEY)
        .or_else(|| context.messages.first().map(|msg| msg.timestamp))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let updated_at = context
        .timestamp(UPDATED_AT_KEY)
        .or_else(|| context.messages.last().map(|msg| msg.timestamp))
        .unwrap_or(created_at);
    ContextSummary {
        session_id: context.session_id.clone(),
        message_count: context.messages.len(),
        created_at,
        updated_at,
    }
}
