// src/server/ui.rs
//! Presentation-layer session state.
//!
//! One explicit state machine per browser session instead of a pile of
//! boolean flags. The display transcript kept here duplicates the
//! conversation store's transcript; the page renders from this copy.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::chat::session::Turn;

/// Page state machine.
///
/// AwaitingName → Chatting on a successful name check; Chatting → Analyzing
/// while the classifier runs, then back; Clear returns any phase to
/// AwaitingName.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingName,
    Chatting,
    Analyzing,
}

impl Phase {
    pub fn can_chat(self) -> bool {
        matches!(self, Phase::Chatting)
    }
}

#[derive(Debug, Clone)]
pub struct UiSession {
    pub name: Option<String>,
    pub phase: Phase,
    pub messages: Vec<Turn>,
    last_active: DateTime<Utc>,
}

impl UiSession {
    fn new() -> Self {
        Self {
            name: None,
            phase: Phase::AwaitingName,
            messages: Vec::new(),
            last_active: Utc::now(),
        }
    }
}

/// Token-keyed store of UI sessions.
#[derive(Default)]
pub struct UiSessions {
    inner: RwLock<HashMap<String, UiSession>>,
}

impl UiSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, session_id: &str) {
        self.inner
            .write()
            .await
            .insert(session_id.to_string(), UiSession::new());
    }

    /// Snapshot of one session. `None` for unknown or expired tokens.
    pub async fn get(&self, session_id: &str) -> Option<UiSession> {
        let mut inner = self.inner.write().await;
        let session = inner.get_mut(session_id)?;
        session.last_active = Utc::now();
        Some(session.clone())
    }

    /// Record the employee name and move into the chat phase.
    pub async fn set_name(&self, session_id: &str, name: &str) -> Option<Phase> {
        let mut inner = self.inner.write().await;
        let session = inner.get_mut(session_id)?;
        session.name = Some(name.to_string());
        session.phase = Phase::Chatting;
        session.last_active = Utc::now();
        Some(session.phase)
    }

    pub async fn set_phase(&self, session_id: &str, phase: Phase) {
        if let Some(session) = self.inner.write().await.get_mut(session_id) {
            session.phase = phase;
            session.last_active = Utc::now();
        }
    }

    /// Append one user/assistant exchange to the display transcript.
    pub async fn push_exchange(&self, session_id: &str, user_text: &str, reply: &str) {
        if let Some(session) = self.inner.write().await.get_mut(session_id) {
            session.messages.push(Turn::user(user_text));
            session.messages.push(Turn::assistant(reply));
            session.last_active = Utc::now();
        }
    }

    /// Clear chat: drop the transcript and the name, back to AwaitingName.
    pub async fn reset(&self, session_id: &str) {
        if let Some(session) = self.inner.write().await.get_mut(session_id) {
            session.name = None;
            session.phase = Phase::AwaitingName;
            session.messages.clear();
            session.last_active = Utc::now();
        }
    }

    /// Remove sessions idle for longer than `ttl`. Returns how many were
    /// evicted.
    pub async fn evict_stale(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|_, session| session.last_active > cutoff);
        before - inner.len()
    }
}
