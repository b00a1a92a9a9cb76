// src/chat/session.rs
//! In-memory conversation transcripts, keyed by opaque session tokens.
//!
//! Transcripts live only in process memory and are lost on restart. Idle
//! sessions are evicted by the sweeper task in the server module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

struct SessionEntry {
    turns: Vec<Turn>,
    last_active: DateTime<Utc>,
}

/// Token-keyed transcript store.
///
/// Entries are created on first append, so callers never register a session
/// up front. All access goes through the store; nothing holds a transcript
/// reference across requests.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

/// Generates a new random session token (UUID v4)
pub fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, creating the session on first use.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                turns: Vec::new(),
                last_active: Utc::now(),
            });
        entry.turns.push(turn);
        entry.last_active = Utc::now();
    }

    /// Snapshot of the transcript in chronological order. Unknown sessions
    /// read as empty.
    pub async fn transcript(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default()
    }

    /// Drop a session's transcript entirely.
    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Remove sessions idle for longer than `ttl`. Returns how many were
    /// evicted.
    pub async fn evict_stale(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active > cutoff);
        before - sessions.len()
    }
}
