//! Roast generation: tones, prompts, conversation state, and the client
//!
//! Control flow for one turn:
//! `RoastClient::generate_roast` → `PromptBuilder::build` → `Transport::send`
//! → classification → history update → [`CompletionResult`].

pub mod client;
pub mod conversation;
pub mod envelope;
pub mod prompt;
pub mod tone;

pub use client::RoastClient;
pub use conversation::{ConversationHistory, Role, Turn};
pub use prompt::{CompletionRequest, CompletionSettings, PromptBuilder};
pub use tone::{RoastLevel, tone_for};

use crate::error::RoastError;

/// Outcome of one chat-completion attempt
///
/// Every failure path of the client resolves to one of these; nothing is
/// raised past the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Success(String),
    RateLimited,
    /// Success status with an unusable envelope; carries the raw body
    MalformedResponse(String),
    /// Connectivity failure or unexpected status; carries diagnostic detail
    TransportFailure(String),
}

impl CompletionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionResult::Success(_))
    }

    /// Roast text on success
    pub fn text(&self) -> Option<&str> {
        match self {
            CompletionResult::Success(text) => Some(text),
            _ => None,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            CompletionResult::Success(_) => OutcomeKind::Success,
            CompletionResult::RateLimited => OutcomeKind::RateLimited,
            CompletionResult::MalformedResponse(_) => OutcomeKind::MalformedResponse,
            CompletionResult::TransportFailure(_) => OutcomeKind::TransportFailure,
        }
    }

    /// Convert to the caller-facing form: roast text or a user-presentable error
    pub fn into_result(self) -> Result<String, RoastError> {
        match self {
            CompletionResult::Success(text) => Ok(text),
            CompletionResult::RateLimited => Err(RoastError::RateLimited),
            CompletionResult::MalformedResponse(raw) => Err(RoastError::MalformedResponse { raw }),
            CompletionResult::TransportFailure(detail) => {
                Err(RoastError::TransportFailure { detail })
            }
        }
    }
}

/// Label-safe outcome category, shared by logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    RateLimited,
    MalformedResponse,
    TransportFailure,
    EmptyInput,
    Timeout,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::RateLimited => "rate_limited",
            OutcomeKind::MalformedResponse => "malformed_response",
            OutcomeKind::TransportFailure => "transport_failure",
            OutcomeKind::EmptyInput => "empty_input",
            OutcomeKind::Timeout => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_maps_every_variant() {
        assert_eq!(
            CompletionResult::Success("burn".to_string()).into_result(),
            Ok("burn".to_string())
        );
        assert_eq!(
            CompletionResult::RateLimited.into_result(),
            Err(RoastError::RateLimited)
        );
        assert_eq!(
            CompletionResult::MalformedResponse("{}".to_string()).into_result(),
            Err(RoastError::MalformedResponse {
                raw: "{}".to_string()
            })
        );
        assert_eq!(
            CompletionResult::TransportFailure("HTTP 500".to_string()).into_result(),
            Err(RoastError::TransportFailure {
                detail: "HTTP 500".to_string()
            })
        );
    }

    #[test]
    fn test_kind_matches_error_kind() {
        for result in [
            CompletionResult::RateLimited,
            CompletionResult::MalformedResponse(String::new()),
            CompletionResult::TransportFailure(String::new()),
        ] {
            let kind = result.kind();
            let error = result.into_result().expect_err("failure variant");
            assert_eq!(error.kind(), kind);
        }
    }

    #[test]
    fn test_text_only_on_success() {
        assert_eq!(CompletionResult::Success("x".to_string()).text(), Some("x"));
        assert_eq!(CompletionResult::RateLimited.text(), None);
    }
}
