use std::sync::Arc;
use std::time::Duration;

use crate::assessment::catalog::Catalog;
use crate::assessment::session::{SessionRetention, SessionStore};
use crate::config::Config;
use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable for the life of the process.
    pub catalog: Arc<Catalog>,
    /// In-memory assessment attempts. Lost on restart, evicted after their retention window.
    pub sessions: SessionStore,
    /// Pluggable completion backend. `LlmClient` when an API key is set, else `OfflineBackend`.
    pub ai: Arc<dyn CompletionBackend>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog, ai: Arc<dyn CompletionBackend>) -> Self {
        let catalog = Arc::new(catalog);
        let retention = SessionRetention {
            submitted: Duration::from_secs(config.session_retention_secs),
            idle: Duration::from_secs(config.session_idle_timeout_secs),
        };
        Self {
            sessions: SessionStore::with_retention(catalog.clone(), retention),
            config,
            catalog,
            ai,
        }
    }
}
