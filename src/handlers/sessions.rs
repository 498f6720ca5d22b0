//! Session inspection and teardown
//!
//! GET /sessions/{id} returns the turn history; DELETE /sessions/{id} drops it.

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::roast::Turn;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session history view
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub turns: Vec<Turn>,
}

pub async fn get_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let history = state.sessions().snapshot(session_id).await?;
    Ok(Json(SessionResponse {
        session_id,
        turns: history.turns().to_vec(),
    }))
}

pub async fn delete_handler(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.sessions().remove(session_id).await {
        tracing::debug!(session_id = %session_id, "Session removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(session_id))
    }
}
