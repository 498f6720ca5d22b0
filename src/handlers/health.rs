//! Liveness endpoint
//!
//! Reports process-local state only; the provider is never probed, so a
//! healthy response says nothing about upstream availability.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::handlers::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Model every roast is sent to
    pub model: String,
    /// Live conversation sessions held in memory
    pub sessions: usize,
    /// "degraded" once any metrics write has failed, otherwise "operational"
    pub metrics_status: &'static str,
}

pub async fn handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let metrics_status = if state.metrics().recording_failures_count() > 0 {
        "degraded"
    } else {
        "operational"
    };

    let body = HealthResponse {
        status: "OK",
        model: state.client().settings().model().to_string(),
        sessions: state.sessions().len().await,
        metrics_status,
    };

    (StatusCode::OK, Json(body))
}
