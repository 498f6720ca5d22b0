//! Transport capability for chat-completion calls
//!
//! The client is written against [`Transport`] only. Production uses
//! [`HttpTransport`]; tests hand the client a [`SimulatedTransport`] instead.
//! Nothing else differs between the two setups.

pub mod http;
pub mod simulated;

pub use http::HttpTransport;
pub use simulated::{
    Disposition, MockRule, RequestLogEntry, SimulatedTransport, SimulatedTransportBuilder,
};

use async_trait::async_trait;
use uuid::Uuid;

/// Path of the chat-completions endpoint, relative to the provider base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// HTTP status the provider uses to signal rate limiting
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// An outgoing call: target endpoint, correlation id, and JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    endpoint: String,
    request_id: Uuid,
    body: String,
}

impl TransportRequest {
    /// Create a request with a fresh request id
    pub fn new(endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        Self::with_request_id(endpoint, body, Uuid::new_v4())
    }

    pub fn with_request_id(
        endpoint: impl Into<String>,
        body: impl Into<String>,
        request_id: Uuid,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_id,
            body: body.into(),
        }
    }

    /// Endpoint path, e.g. `/chat/completions`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Status and raw body of a completed call
///
/// Non-2xx statuses are still `Ok` at the transport layer; classifying them is
/// the client's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    status: u16,
    body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with a JSON body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == STATUS_TOO_MANY_REQUESTS
    }
}

/// Failure to complete a call at all (no status was received)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("Could not connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("Transport error on {endpoint}: {message}")]
    Other { endpoint: String, message: String },
}

impl TransportError {
    /// Endpoint the failed call targeted
    pub fn endpoint(&self) -> &str {
        match self {
            TransportError::Timeout { endpoint, .. }
            | TransportError::Connect { endpoint, .. }
            | TransportError::Other { endpoint, .. } => endpoint,
        }
    }

    /// Fallback rate-limit detection for errors that carry no status code
    ///
    /// Some transports surface HTTP 429 only inside an error message. This is
    /// a string sniff and is consulted only on the error path; responses with
    /// a status code are classified by [`TransportResponse::is_rate_limited`].
    pub fn indicates_rate_limit(&self) -> bool {
        match self {
            TransportError::Timeout { .. } => false,
            TransportError::Connect { message, .. } | TransportError::Other { message, .. } => {
                mentions_rate_limit(message)
            }
        }
    }
}

/// True when free text reads like an HTTP 429 / rate-limit report
pub fn mentions_rate_limit(message: &str) -> bool {
    const MARKERS: &[&str] = &["429", "rate limit", "rate-limit", "ratelimit", "too many requests"];
    let lowered = message.to_lowercase();
    MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Capability to send one chat-completion call
///
/// Implementations must be shareable across sessions; the rule set and
/// credentials they hold are read-mostly process configuration.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_status_classification() {
        assert!(TransportResponse::ok("{}").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(429, "").is_success());
        assert!(TransportResponse::new(429, "").is_rate_limited());
        assert!(!TransportResponse::new(500, "").is_rate_limited());
    }

    #[test]
    fn test_mentions_rate_limit_markers() {
        assert!(mentions_rate_limit("HTTP 429"));
        assert!(mentions_rate_limit("Rate limit exceeded for model"));
        assert!(mentions_rate_limit("Too Many Requests"));
        assert!(!mentions_rate_limit("connection refused"));
        assert!(!mentions_rate_limit(""));
    }

    #[test]
    fn test_timeout_never_indicates_rate_limit() {
        let error = TransportError::Timeout {
            endpoint: "/chat/completions".to_string(),
            timeout_ms: 429,
        };
        assert!(!error.indicates_rate_limit());
    }

    #[test]
    fn test_error_message_rate_limit_detection() {
        let error = TransportError::Other {
            endpoint: "/chat/completions".to_string(),
            message: "upstream returned 429 Too Many Requests".to_string(),
        };
        assert!(error.indicates_rate_limit());
        assert_eq!(error.endpoint(), "/chat/completions");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = TransportRequest::new(CHAT_COMPLETIONS_PATH, "{}");
        let b = TransportRequest::new(CHAT_COMPLETIONS_PATH, "{}");
        assert_ne!(a.request_id(), b.request_id());
    }
}
