//! Core types and structures for claudechat
//!
//! This crate provides the foundational types used across all claudechat crates.

use chrono::Local;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default model used for completions
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default maximum number of output tokens per completion
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Seconds to wait for a completion before treating the turn as failed
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// System directive sent with every completion request
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are the founder of GrowthX, and your name is Udayan, and you always talk like Yoda!";

// ============================================================================
// Message Types
// ============================================================================

/// Who produced a message. The set is closed: conversations only ever
/// contain user and assistant turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Claude",
        }
    }
}

/// One turn of conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Message {
    /// Build a message stamped with the current local time (ISO-8601).
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now().to_rfc3339(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

// ============================================================================
// Conversation Metadata
// ============================================================================

/// Identity and bookkeeping for one stored conversation. The message log
/// itself lives on the session; this travels alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMeta {
    pub id: String,
    pub created_at: String,
    pub last_updated: String,
}

impl ConversationMeta {
    /// Metadata for a freshly created conversation.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Local::now().to_rfc3339();
        Self {
            id: id.into(),
            created_at: now.clone(),
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_role_roundtrip() {
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
        assert!(!msg.timestamp.is_empty());

        let msg = Message::assistant("hi there");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_message_deserializes_without_timestamp() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"user","content":"Hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hi");
        assert!(msg.timestamp.is_empty());
    }

    #[test]
    fn test_new_meta_starts_with_matching_timestamps() {
        let meta = ConversationMeta::new("a1b2c3d4");
        assert_eq!(meta.id, "a1b2c3d4");
        assert_eq!(meta.created_at, meta.last_updated);
    }
}
