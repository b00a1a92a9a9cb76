// src/chat/mod.rs
//! Conversation service over the hosted model.
//!
//! Each `predict` call appends the user turn, renders the whole transcript
//! into one prompt, and stores the cleaned reply. Transport and model errors
//! propagate to the caller untouched; there is no retry.

pub mod session;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::llm::client::TextGenerator;
use session::{Role, SessionStore, Turn};

/// Fixed conversation guidelines sent ahead of every transcript.
const SYSTEM_GUIDELINES: &str = "\
Guidelines for the conversation:

1. Always respond **only as the assistant**. Do **not** speak for or continue the user's message. Your response should only reflect your role as an assistant and not represent the user's thoughts, feelings, or intentions.
2. Respond to each **user message with a single, clear response**. Do not continue the conversation on behalf of the user.
3. Your responses should be empathetic, supportive, and non-judgmental, but always as the assistant.
4. Do not make assumptions or guesses about the user's emotions, experiences, or thoughts. Focus on providing helpful, direct responses to their input.";

pub struct ConversationService {
    generator: Arc<dyn TextGenerator>,
    sessions: Arc<SessionStore>,
}

impl ConversationService {
    pub fn new(generator: Arc<dyn TextGenerator>, sessions: Arc<SessionStore>) -> Self {
        Self {
            generator,
            sessions,
        }
    }

    /// Generate a response for a given user message.
    ///
    /// The user turn is recorded before the model call, so a failed call
    /// still leaves it in the transcript.
    pub async fn predict(&self, text: &str, session_id: &str) -> Result<String> {
        self.sessions.append(session_id, Turn::user(text)).await;

        let transcript = self.sessions.transcript(session_id).await;
        let prompt = render_prompt(&transcript);

        debug!(session_id, turns = transcript.len(), "Calling model");
        let raw = self.generator.generate(&prompt).await?;

        let reply = clean_reply(&raw);
        self.sessions
            .append(session_id, Turn::assistant(reply.clone()))
            .await;

        Ok(reply)
    }
}

/// Render the guidelines plus the transcript into a single prompt string,
/// ending with an `AI:` cue so the model answers as the assistant.
fn render_prompt(transcript: &[Turn]) -> String {
    let mut prompt = String::from(SYSTEM_GUIDELINES);
    prompt.push_str("\n\n");
    for turn in transcript {
        match turn.role {
            Role::User => {
                prompt.push_str("Human: ");
                prompt.push_str(&turn.text);
                prompt.push('\n');
            }
            Role::Assistant => {
                prompt.push_str("AI: ");
                prompt.push_str(&turn.text);
                prompt.push('\n');
            }
        }
    }
    prompt.push_str("AI:");
    prompt
}

/// Strip the role-prefix artifacts the model tends to echo back.
pub fn clean_reply(raw: &str) -> String {
    raw.replace("AI:", "")
        .replace("Human:", "")
        .replace("Assistant:", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_reply_strips_role_prefixes() {
        assert_eq!(clean_reply("AI: Hello there"), "Hello there");
        assert_eq!(clean_reply("  Assistant: Hi  "), "Hi");
        assert_eq!(
            clean_reply("Sure. Human: and then you said"),
            "Sure.  and then you said"
        );
    }

    #[test]
    fn clean_reply_can_empty_out() {
        assert_eq!(clean_reply("AI: "), "");
        assert_eq!(clean_reply("   "), "");
    }

    #[test]
    fn prompt_ends_with_assistant_cue() {
        let transcript = vec![Turn::user("I had a rough week")];
        let prompt = render_prompt(&transcript);
        assert!(prompt.starts_with("Guidelines for the conversation:"));
        assert!(prompt.contains("Human: I had a rough week\n"));
        assert!(prompt.ends_with("AI:"));
    }

    #[test]
    fn prompt_interleaves_roles_in_order() {
        let transcript = vec![
            Turn::user("first"),
            Turn::assistant("reply"),
            Turn::user("second"),
        ];
        let prompt = render_prompt(&transcript);
        let human_first = prompt.find("Human: first").unwrap();
        let ai_reply = prompt.find("AI: reply").unwrap();
        let human_second = prompt.find("Human: second").unwrap();
        assert!(human_first < ai_reply && ai_reply < human_second);
    }
}
