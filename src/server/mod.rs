// src/server/mod.rs
//! HTTP server and the single-page UI.
//!
//! Endpoints:
//! - GET  /                - the page
//! - GET  /api/status      - health check
//! - POST /api/session     - new session token + onboarding message
//! - POST /api/name        - name check, AwaitingName -> Chatting
//! - POST /api/chat        - one conversation exchange
//! - POST /api/analyze     - classify the conversation and persist
//! - GET  /api/analyses    - stored rows + per-label counts
//! - GET  /api/report.pdf  - PDF export of the stored rows
//! - POST /api/clear       - reset the session

mod handlers;
pub mod ui;

use anyhow::Result;
use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::chat::ConversationService;
use crate::chat::session::SessionStore;
use crate::llm::client::TextGenerator;
use crate::store::AnalysisStore;
use ui::UiSessions;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ConversationService>,
    pub generator: Arc<dyn TextGenerator>,
    pub conversations: Arc<SessionStore>,
    pub ui: Arc<UiSessions>,
    pub analyses: Arc<AnalysisStore>,
    pub onboarding_message: String,
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/status", get(handlers::status))
        .route("/api/session", post(handlers::create_session))
        .route("/api/name", post(handlers::check_name))
        .route("/api/chat", post(handlers::send_message))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/analyses", get(handlers::list_analyses))
        .route("/api/report.pdf", get(handlers::report_pdf))
        .route("/api/clear", post(handlers::clear_chat))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until it fails or the process stops.
pub async fn run(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = create_router(state);
    let bind_address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically evict idle sessions from both the conversation store and
/// the UI store.
pub fn spawn_session_sweeper(
    conversations: Arc<SessionStore>,
    ui: Arc<UiSessions>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        // the first tick fires immediately, skip it
        tick.tick().await;
        loop {
            tick.tick().await;
            let evicted = conversations.evict_stale(ttl).await + ui.evict_stale(ttl).await;
            if evicted > 0 {
                debug!("Evicted {} stale sessions", evicted);
            }
        }
    })
}
