// src/main.rs

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pulsecheck::chat::ConversationService;
use pulsecheck::chat::session::SessionStore;
use pulsecheck::config::CONFIG;
use pulsecheck::llm::WatsonxClient;
use pulsecheck::server::{self, AppState, ui::UiSessions};
use pulsecheck::store::AnalysisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting pulsecheck");
    info!("Model: {}", CONFIG.model_id);

    let analyses = Arc::new(
        AnalysisStore::connect(&CONFIG.database_url, CONFIG.sqlite_max_connections).await?,
    );

    let generator: Arc<dyn pulsecheck::llm::TextGenerator> =
        Arc::new(WatsonxClient::new(&CONFIG)?);
    let conversations = Arc::new(SessionStore::new());
    let chat = Arc::new(ConversationService::new(
        generator.clone(),
        conversations.clone(),
    ));
    let ui = Arc::new(UiSessions::new());

    let ttl = Duration::from_secs(CONFIG.session_ttl_seconds);
    let sweep_interval = Duration::from_secs(CONFIG.session_sweep_interval);
    let sweeper =
        server::spawn_session_sweeper(conversations.clone(), ui.clone(), ttl, sweep_interval);
    info!(
        "Session sweeper running every {}s (ttl {}s)",
        sweep_interval.as_secs(),
        ttl.as_secs()
    );

    let state = AppState {
        chat,
        generator,
        conversations,
        ui,
        analyses,
        onboarding_message: CONFIG.onboarding_message.clone(),
    };

    tokio::select! {
        result = server::run(state, &CONFIG.host, CONFIG.port) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = sweeper => {
            error!("Session sweeper unexpectedly terminated");
        }
    }

    Ok(())
}
