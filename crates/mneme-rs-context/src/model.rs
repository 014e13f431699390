//! Persisted context model for conversation sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Reserved metadata key for the first-persistence timestamp.
pub const CREATED_AT_KEY: &str = "createdAt";
/// Reserved metadata key for the last-mutation timestamp.
pub const UPDATED_AT_KEY: &str = "updatedAt";

/// Role of a conversation message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user message.
    User,
    /// Assistant reply.
    Assistant,
    /// System instruction.
    System,
}

impl Role {
    /// Wire name for the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Text payload. Any valid text is allowed, including empty strings.
    pub content: String,
    /// Author role.
    pub role: Role,
    /// Creation timestamp, assigned when the message is built for append.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message timestamped now.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role,
            timestamp: Utc::now(),
        }
    }
}

/// Persisted state for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Opaque session identifier; unique across the store.
    pub session_id: String,
    /// Ordered message history. Insertion order is preserved exactly.
    pub messages: Vec<Message>,
    /// Caller-owned metadata plus the reserved `createdAt`/`updatedAt` keys.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Context {
    /// Create an empty context for a session.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Refresh `updatedAt` and set `createdAt` when absent.
    ///
    /// `updatedAt` never moves backwards, even under clock skew.
    pub fn touch(&mut self) {
        let now = Utc::now();
        let updated = match self.timestamp(UPDATED_AT_KEY) {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.metadata
            .insert(UPDATED_AT_KEY.to_string(), Value::String(updated.to_rfc3339()));
        if !self.metadata.contains_key(CREATED_AT_KEY) {
            self.metadata
                .insert(CREATED_AT_KEY.to_string(), Value::String(now.to_rfc3339()));
        }
    }

    /// Read a reserved timestamp from metadata, if present and parseable.
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

/// Summary record used for listing contexts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContextSummary {
    /// Session identifier.
    pub session_id: String,
    /// Total number of messages.
    pub message_count: usize,
    /// First-persistence timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-mutation timestamp.
    pub updated_at: DateTime<Utc>,
}
