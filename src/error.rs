//! Error types for Roastmaster
//!
//! [`RoastError`] is the caller-facing outcome taxonomy; its `Display` text is
//! what a user sees. [`AppError`] wraps it for the application and implements
//! `IntoResponse` for Axum handlers.

use crate::roast::OutcomeKind;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

/// Failed roast attempt, as presented to a user
///
/// Every variant is terminal for the attempt; retrying is the caller's call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoastError {
    /// Submission was empty or whitespace-only; no remote call was made
    #[error("Nothing to roast: paste some code first.")]
    EmptyInput,

    /// Provider signalled over-quota, by status code or error message
    #[error("The roast provider hit its rate limit. Please try again later.")]
    RateLimited,

    /// Success status, but the envelope had no usable `choices[0].message.content`
    #[error("The roast provider sent a response that could not be understood. Raw response: {raw}")]
    MalformedResponse { raw: String },

    /// Connectivity failure, timeout, or unexpected status
    #[error("Could not get a roast from the provider: {detail}")]
    TransportFailure { detail: String },
}

impl RoastError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            RoastError::EmptyInput => OutcomeKind::EmptyInput,
            RoastError::RateLimited => OutcomeKind::RateLimited,
            RoastError::MalformedResponse { .. } => OutcomeKind::MalformedResponse,
            RoastError::TransportFailure { .. } => OutcomeKind::TransportFailure,
        }
    }
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Missing API credential: environment variable {env_var} is not set or empty")]
    MissingCredential { env_var: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Session {0} already has a roast in progress")]
    SessionBusy(Uuid),

    #[error("Roast timed out after {timeout_seconds} seconds")]
    RoastTimeout { timeout_seconds: u64 },

    #[error(transparent)]
    Roast(#[from] RoastError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status used when this error reaches a handler boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionBusy(_) => StatusCode::CONFLICT,
            Self::RoastTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Roast(RoastError::EmptyInput) => StatusCode::BAD_REQUEST,
            Self::Roast(RoastError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            Self::Roast(RoastError::MalformedResponse { .. })
            | Self::Roast(RoastError::TransportFailure { .. }) => StatusCode::BAD_GATEWAY,
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::MissingCredential { .. }
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;
