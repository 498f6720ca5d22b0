//! Prometheus scrape endpoint
//!
//! ```bash
//! curl http://localhost:3000/metrics
//! # HELP roastmaster_roasts_total Total roast attempts by roast level and outcome
//! # TYPE roastmaster_roasts_total counter
//! roastmaster_roasts_total{level="savage",outcome="success"} 42
//! ```

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use crate::handlers::AppState;

/// 200 with the text exposition format, or 500 if encoding fails
pub async fn handler(State(state): State<AppState>) -> Response {
    match state.metrics().gather() {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            output,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics for scrape");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
                .into_response()
        }
    }
}
