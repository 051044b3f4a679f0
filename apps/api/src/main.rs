mod ai;
mod assessment;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::catalog::Catalog;
use crate::config::Config;
use crate::llm_client::{CompletionBackend, LlmClient, OfflineBackend};
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerPath API v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate the built-in assessments
    let catalog = Catalog::builtin().context("Built-in assessment catalog is invalid")?;
    info!("Assessment catalog loaded ({} assessments)", catalog.len());

    // Initialize completion backend (offline fallbacks when no API key is set)
    let ai: Arc<dyn CompletionBackend> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone()).context("Failed to build LLM client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI features will serve fallback content");
            Arc::new(OfflineBackend)
        }
    };
    info!(
        "AI fallbacks {}",
        if config.ai_fallback_enabled { "enabled" } else { "disabled" }
    );

    let state = AppState::new(config.clone(), catalog, ai);
    state.sessions.spawn_sweeper(SESSION_SWEEP_INTERVAL);
    info!(
        "Session retention: {}s after submission, {}s idle",
        config.session_retention_secs, config.session_idle_timeout_secs
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
