// tests/test_helpers.rs
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use pulsecheck::chat::ConversationService;
use pulsecheck::chat::session::SessionStore;
use pulsecheck::llm::TextGenerator;
use pulsecheck::server::{AppState, ui::UiSessions};
use pulsecheck::store::AnalysisStore;

/// Replays canned model responses in order; errors once the script runs
/// out.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _input: &str) -> Result<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted reply left"))
    }
}

/// Always fails, for transport-error paths.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _input: &str) -> Result<String> {
        Err(anyhow!("model endpoint unreachable"))
    }
}

/// App state over an in-memory database and the given generator.
pub async fn test_app_state(generator: Arc<dyn TextGenerator>) -> AppState {
    let analyses = Arc::new(
        AnalysisStore::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory store"),
    );
    let conversations = Arc::new(SessionStore::new());
    let chat = Arc::new(ConversationService::new(
        generator.clone(),
        conversations.clone(),
    ));

    AppState {
        chat,
        generator,
        conversations,
        ui: Arc::new(UiSessions::new()),
        analyses,
        onboarding_message: "Could you tell us your feelings about XYZ Corp work environment?"
            .to_string(),
    }
}
