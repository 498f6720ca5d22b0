//! Roast endpoint handler
//!
//! Handles POST /roast. A request without `session_id` starts a new session;
//! one with an id continues that conversation.

use crate::error::{AppError, AppResult, RoastError};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::roast::OutcomeKind;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Roast request from a client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoastRequest {
    pub code: String,
    /// Free-form level; unknown values get the fallback tone
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// Successful roast
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoastResponse {
    pub session_id: Uuid,
    pub roast: String,
    /// Level as requested (or the configured default)
    pub level: String,
    /// Turns in the session history after this exchange
    pub turns: usize,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RoastRequest>,
) -> AppResult<Json<RoastResponse>> {
    let started = Instant::now();
    let level = request
        .level
        .unwrap_or_else(|| state.config().completion.default_level().to_string());

    if request.code.trim().is_empty() {
        state
            .metrics()
            .record_roast(&level, OutcomeKind::EmptyInput, 0.0);
        return Err(RoastError::EmptyInput.into());
    }

    // A session created here is only handed out on success
    let created_here = request.session_id.is_none();
    let session_id = match request.session_id {
        Some(id) => id,
        None => state.sessions().create().await,
    };

    let mut history = state.sessions().checkout(session_id).await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        roast_level = %level,
        history_len = history.len(),
        code_length = request.code.len(),
        "Roast requested"
    );

    let timeout_seconds = state.config().server.request_timeout_seconds;
    let outcome = tokio::time::timeout(
        Duration::from_secs(timeout_seconds),
        state.client().roast(&request.code, &level, &mut history),
    )
    .await;
    let turns = history.len();
    drop(history);

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let succeeded = matches!(outcome, Ok(Ok(_)));
    if created_here && !succeeded {
        state.sessions().remove(session_id).await;
        tracing::debug!(
            request_id = %request_id,
            session_id = %session_id,
            "Discarded session whose first roast failed"
        );
    }

    match outcome {
        Ok(Ok(roast)) => {
            state
                .metrics()
                .record_roast(&level, OutcomeKind::Success, elapsed_ms);
            Ok(Json(RoastResponse {
                session_id,
                roast,
                level,
                turns,
            }))
        }
        Ok(Err(error)) => {
            state.metrics().record_roast(&level, error.kind(), elapsed_ms);
            tracing::warn!(
                request_id = %request_id,
                session_id = %session_id,
                outcome = error.kind().as_str(),
                error = %error,
                "Roast failed"
            );
            Err(error.into())
        }
        Err(_) => {
            state
                .metrics()
                .record_roast(&level, OutcomeKind::Timeout, elapsed_ms);
            tracing::error!(
                request_id = %request_id,
                session_id = %session_id,
                timeout_seconds = timeout_seconds,
                "Roast timed out; provider result will be discarded"
            );
            Err(AppError::RoastTimeout { timeout_seconds })
        }
    }
}
