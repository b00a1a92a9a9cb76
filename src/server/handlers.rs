// src/server/handlers.rs

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::AppState;
use super::ui::Phase;
use crate::chat::session::generate_session_token;
use crate::export::{ExportError, render_report};
use crate::llm::classify::{ClassifyError, classify_satisfaction};

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn internal_error(err: anyhow::Error) -> ApiError {
    error!("Internal error: {:#}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub session_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

pub async fn status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_session(State(state): State<AppState>) -> Json<Value> {
    let token = generate_session_token();
    state.ui.create(&token).await;
    debug!("Created session {}", token);

    Json(json!({
        "session_id": token,
        "onboarding_message": state.onboarding_message,
    }))
}

/// Name check. The database lookup only picks the greeting; it has no
/// effect on anything later.
pub async fn check_name(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Please enter your name."));
    }
    if state.ui.get(&request.session_id).await.is_none() {
        return Err(api_error(StatusCode::NOT_FOUND, "Unknown session."));
    }

    let returning = state
        .analyses
        .name_exists(name)
        .await
        .map_err(internal_error)?;

    state.ui.set_name(&request.session_id, name).await;

    let greeting = if returning {
        format!(
            "Welcome back, {}! Your previous records exist in the database.",
            name
        )
    } else {
        format!("Nice to meet you, {}! Let's get started.", name)
    };

    Ok(Json(json!({
        "greeting": greeting,
        "returning": returning,
        "phase": Phase::Chatting,
    })))
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Please enter a message."));
    }

    let Some(session) = state.ui.get(&request.session_id).await else {
        return Err(api_error(StatusCode::NOT_FOUND, "Unknown session."));
    };
    if !session.phase.can_chat() {
        return Err(api_error(
            StatusCode::CONFLICT,
            "Enter your name before chatting.",
        ));
    }

    let reply = state
        .chat
        .predict(message, &request.session_id)
        .await
        .map_err(internal_error)?;

    if reply.is_empty() {
        return Ok(Json(json!({
            "reply": Value::Null,
            "warning": "The chatbot response was empty or invalid.",
            "transcript": session.messages,
        })));
    }

    state
        .ui
        .push_exchange(&request.session_id, message, &reply)
        .await;
    let transcript = state
        .ui
        .get(&request.session_id)
        .await
        .map(|s| s.messages)
        .unwrap_or_default();

    Ok(Json(json!({
        "reply": reply,
        "transcript": transcript,
    })))
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(session) = state.ui.get(&request.session_id).await else {
        return Err(api_error(StatusCode::NOT_FOUND, "Unknown session."));
    };
    let Some(name) = session.name.clone() else {
        return Err(api_error(
            StatusCode::CONFLICT,
            "Enter your name before analyzing.",
        ));
    };
    if session.messages.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "No conversation data available to analyze!",
        ));
    }

    state
        .ui
        .set_phase(&request.session_id, Phase::Analyzing)
        .await;
    let result = classify_satisfaction(state.generator.as_ref(), &session.messages).await;
    state
        .ui
        .set_phase(&request.session_id, Phase::Chatting)
        .await;

    match result {
        Ok(report) => {
            state
                .analyses
                .insert(&name, &report.satisfaction)
                .await
                .map_err(internal_error)?;
            info!("Saved analysis for {}: {}", name, report.satisfaction);

            Ok(Json(json!({
                "analysis": report,
                "saved": true,
            })))
        }
        Err(ClassifyError::Generation(err)) => Err(internal_error(err)),
        Err(err) => {
            let raw_response = err.raw_response().map(str::to_string);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": err.to_string(),
                    "raw_response": raw_response,
                })),
            ))
        }
    }
}

pub async fn list_analyses(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let rows = state.analyses.list_all().await.map_err(internal_error)?;

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for row in &rows {
        *counts.entry(row.satisfaction.clone()).or_insert(0) += 1;
    }

    Ok(Json(json!({
        "rows": rows,
        "counts": counts,
    })))
}

pub async fn report_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.analyses.list_all().await.map_err(internal_error)?;

    match render_report(&rows) {
        Ok(bytes) => Ok((
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"employee_satisfaction_report.pdf\"",
                ),
            ],
            bytes,
        )),
        Err(ExportError::NoData) => Err(api_error(
            StatusCode::CONFLICT,
            ExportError::NoData.to_string(),
        )),
    }
}

/// Clear chat: forget the conversation and reset the page state. Idempotent.
pub async fn clear_chat(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Json<Value> {
    state.conversations.clear(&request.session_id).await;
    state.ui.reset(&request.session_id).await;

    Json(json!({ "phase": Phase::AwaitingName }))
}
