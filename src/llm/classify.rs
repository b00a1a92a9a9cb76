// src/llm/classify.rs
//! Second-pass sentiment classification over a full conversation.
//!
//! The model is asked for a single JSON object; the reply is still freeform
//! text, so the object is pulled out with a depth-counting brace scan before
//! parsing. Every failure shape carries the verbatim model text so the UI
//! can show what actually came back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::session::{Role, Turn};
use crate::llm::client::TextGenerator;

/// Structured output of the satisfaction pass.
///
/// `satisfaction` is intended to be one of Bad/Average/Good but is not
/// enforced as an enumeration; the model's label is stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionReport {
    pub name_of_employee: String,
    pub satisfaction: String,
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("conversation is empty, nothing to analyze")]
    EmptyTranscript,

    #[error("empty response from the model")]
    EmptyResponse { raw_response: String },

    #[error("no JSON object found in model response")]
    NoJsonObject { raw_response: String },

    #[error("JSON parsing failed: {reason}")]
    Parse {
        reason: String,
        raw_response: String,
    },

    #[error("missing name_of_employee or satisfaction in model response")]
    MissingFields { raw_response: String },

    #[error("generation failed: {0}")]
    Generation(#[from] anyhow::Error),
}

impl ClassifyError {
    /// The verbatim model text, when this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            ClassifyError::EmptyResponse { raw_response }
            | ClassifyError::NoJsonObject { raw_response }
            | ClassifyError::Parse { raw_response, .. }
            | ClassifyError::MissingFields { raw_response } => Some(raw_response),
            _ => None,
        }
    }
}

/// Run the satisfaction pass over a transcript.
///
/// An empty transcript short-circuits without touching the model.
pub async fn classify_satisfaction(
    generator: &dyn TextGenerator,
    transcript: &[Turn],
) -> Result<SatisfactionReport, ClassifyError> {
    if transcript.is_empty() {
        return Err(ClassifyError::EmptyTranscript);
    }

    let request = build_prompt(&format_transcript(transcript));
    let raw = generator.generate(&request).await?;

    parse_report(&raw)
}

/// Format a transcript as the alternating `Human: ... AI: ...` lines the
/// classification prompt expects.
pub fn format_transcript(transcript: &[Turn]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_user: Option<&str> = None;

    for turn in transcript {
        match turn.role {
            Role::User => {
                if let Some(user) = pending_user.take() {
                    lines.push(format!("Human: {} AI: ", user));
                }
                pending_user = Some(&turn.text);
            }
            Role::Assistant => {
                let user = pending_user.take().unwrap_or("");
                lines.push(format!("Human: {} AI: {}", user, turn.text));
            }
        }
    }
    if let Some(user) = pending_user {
        lines.push(format!("Human: {} AI: ", user));
    }

    lines.join("\n")
}

fn build_prompt(input_text: &str) -> String {
    format!(
        r#"You are an HR assistant bot tasked with analyzing employee satisfaction based on their conversation history.
Your job is to:
1. Determine the satisfaction level as one of the following: Bad, Average, Good.
2. Extract the employee's name if mentioned, otherwise leave it blank.

Below are examples to guide you:

"I feel overwhelmed with my workload and don't know where to start."
"Satisfaction": "Bad"

"I enjoyed my vacation trip."
"Satisfaction": "Good"

JUST Output a **SINGLE** JSON with the following format:
{{
    "name_of_employee": "<>",
    "satisfaction": "<>"
}}

Conversation:
{input_text}
"#
    )
}

/// Locate the first balanced `{...}` span in the raw text.
///
/// A depth counter tolerates nested braces; braces inside JSON strings are
/// not understood, this stays a heuristic over freeform model output.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;

    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the raw model text into a report, or a structured error that keeps
/// the original text.
pub fn parse_report(raw: &str) -> Result<SatisfactionReport, ClassifyError> {
    if raw.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse {
            raw_response: raw.to_string(),
        });
    }

    let span = extract_json_object(raw).ok_or_else(|| ClassifyError::NoJsonObject {
        raw_response: raw.to_string(),
    })?;

    let parsed: serde_json::Value =
        serde_json::from_str(span).map_err(|e| ClassifyError::Parse {
            reason: e.to_string(),
            raw_response: raw.to_string(),
        })?;

    let name = parsed.get("name_of_employee").and_then(|v| v.as_str());
    let satisfaction = parsed.get("satisfaction").and_then(|v| v.as_str());

    match (name, satisfaction) {
        (Some(name), Some(satisfaction)) => Ok(SatisfactionReport {
            name_of_employee: name.to_string(),
            satisfaction: satisfaction.to_string(),
        }),
        _ => Err(ClassifyError::MissingFields {
            raw_response: raw.to_string(),
        }),
    }
}
