//! HTTP request handlers for the Roastmaster API

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::middleware::request_id_middleware;
use crate::roast::{CompletionSettings, RoastClient};
use crate::session::SessionStore;
use crate::transport::Transport;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod health;
pub mod metrics;
pub mod roast;
pub mod sessions;

/// Application state shared across all handlers
///
/// All fields are Arc'd for cheap cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: Arc<RoastClient>,
    sessions: Arc<SessionStore>,
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create a new AppState around an explicitly supplied transport
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if metrics registration fails.
    pub fn new(config: Arc<Config>, transport: Arc<dyn Transport>) -> AppResult<Self> {
        let metrics = Metrics::new()
            .map_err(|e| AppError::Internal(format!("Failed to initialize metrics: {}", e)))?;

        let settings = CompletionSettings::from_config(config.provider.model(), &config.completion);
        let client = RoastClient::new(transport, settings);

        Ok(Self {
            config,
            client: Arc::new(client),
            sessions: Arc::new(SessionStore::new()),
            metrics: Arc::new(metrics),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &RoastClient {
        &self.client
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

/// Build the full HTTP application
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/roast", post(roast::handler))
        .route(
            "/sessions/{id}",
            get(sessions::get_handler).delete(sessions::delete_handler),
        )
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::state_with;
    use crate::transport::SimulatedTransport;

    #[test]
    fn test_appstate_new_creates_state() {
        let state = state_with(SimulatedTransport::new());
        assert_eq!(state.config().provider.model(), "test-model");
        assert_eq!(state.client().settings().model(), "test-model");
        assert_eq!(state.client().settings().max_output_tokens(), 100);
    }

    #[test]
    fn test_appstate_is_clonable() {
        let state = state_with(SimulatedTransport::new());
        let state2 = state.clone();
        assert_eq!(state2.config().server.request_timeout_seconds, 5);
    }
}
