//! Roast client: one chat-completion call per user turn
//!
//! The client owns an injected [`Transport`]; production and tests differ only
//! in which implementation they pass to [`RoastClient::new`].
//!
//! # History contract
//!
//! After a successful call the history ends with the user turn followed by the
//! assistant turn. On any failure at most the user turn has been added. Existing
//! turns are never touched.
//!
//! # Cancellation
//!
//! The transport call runs on its own task. If the caller drops the
//! `generate_roast` future, the call still runs to completion, but its result is
//! discarded and no assistant turn is appended.

use crate::error::RoastError;
use crate::roast::CompletionResult;
use crate::roast::conversation::{ConversationHistory, Turn};
use crate::roast::envelope::{encode_request, extract_content};
use crate::roast::prompt::{CompletionSettings, PromptBuilder};
use crate::transport::{
    CHAT_COMPLETIONS_PATH, Transport, TransportError, TransportRequest, TransportResponse,
};
use std::sync::Arc;
use std::time::Instant;

/// Generates roasts through a [`Transport`]
///
/// Cheap to share behind an `Arc`; holds no per-session state.
pub struct RoastClient {
    transport: Arc<dyn Transport>,
    prompts: PromptBuilder,
}

impl RoastClient {
    pub fn new(transport: Arc<dyn Transport>, settings: CompletionSettings) -> Self {
        Self {
            transport,
            prompts: PromptBuilder::new(settings),
        }
    }

    pub fn settings(&self) -> &CompletionSettings {
        self.prompts.settings()
    }

    /// Caller-facing entry point: roast text, or a user-presentable error
    ///
    /// Blank submissions are rejected with [`RoastError::EmptyInput`] before
    /// the history is touched or any call is made.
    pub async fn roast(
        &self,
        submission: &str,
        level: &str,
        history: &mut ConversationHistory,
    ) -> Result<String, RoastError> {
        if submission.trim().is_empty() {
            tracing::debug!(roast_level = %level, "Rejected empty submission");
            return Err(RoastError::EmptyInput);
        }

        self.generate_roast(submission, level, history)
            .await
            .into_result()
    }

    /// Run one roast turn
    ///
    /// Accepts any submission, including an empty one. Appends the user turn
    /// (unless the caller already did) before sending, and the assistant turn
    /// only on success.
    pub async fn generate_roast(
        &self,
        submission: &str,
        level: &str,
        history: &mut ConversationHistory,
    ) -> CompletionResult {
        let request = self.prompts.build(submission, level, history);

        if !history.ends_with_user(submission) {
            history.push(Turn::user(submission));
        }

        let body = match encode_request(&request) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode chat-completion request");
                return CompletionResult::TransportFailure(format!(
                    "failed to encode request: {}",
                    e
                ));
            }
        };

        let transport_request = TransportRequest::new(CHAT_COMPLETIONS_PATH, body);
        let request_id = transport_request.request_id();
        let started = Instant::now();

        let outcome = self.dispatch(transport_request).await;
        let result = Self::classify(outcome);
        let latency_ms = started.elapsed().as_millis() as u64;

        match &result {
            CompletionResult::Success(text) => {
                history.push(Turn::assistant(text.clone()));
                tracing::info!(
                    request_id = %request_id,
                    roast_level = %level,
                    history_len = history.len(),
                    latency_ms = latency_ms,
                    outcome = result.kind().as_str(),
                    "Roast generated"
                );
            }
            CompletionResult::RateLimited => {
                tracing::warn!(
                    request_id = %request_id,
                    roast_level = %level,
                    latency_ms = latency_ms,
                    outcome = result.kind().as_str(),
                    "Roast provider rate limited the request"
                );
            }
            CompletionResult::MalformedResponse(raw) => {
                tracing::warn!(
                    request_id = %request_id,
                    roast_level = %level,
                    latency_ms = latency_ms,
                    raw_length = raw.len(),
                    outcome = result.kind().as_str(),
                    "Roast provider returned an unexpected envelope"
                );
            }
            CompletionResult::TransportFailure(detail) => {
                tracing::error!(
                    request_id = %request_id,
                    roast_level = %level,
                    latency_ms = latency_ms,
                    detail = %detail,
                    outcome = result.kind().as_str(),
                    "Roast request failed"
                );
            }
        }

        result
    }

    /// Send on a detached task so an issued call always runs to completion
    async fn dispatch(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let transport = Arc::clone(&self.transport);
        let endpoint = request.endpoint().to_string();

        let handle = tokio::spawn(async move { transport.send(&request).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(TransportError::Other {
                endpoint,
                message: format!("transport task did not complete: {}", join_error),
            }),
        }
    }

    /// Map a raw transport outcome onto the outcome taxonomy
    ///
    /// Rate limiting is recognized on two paths: a 429 status, or (as a
    /// fallback for transports that only report it in text) a transport error
    /// whose message mentions it.
    pub(crate) fn classify(
        outcome: Result<TransportResponse, TransportError>,
    ) -> CompletionResult {
        match outcome {
            Ok(response) if response.is_rate_limited() => CompletionResult::RateLimited,
            Ok(response) if !response.is_success() => CompletionResult::TransportFailure(format!(
                "HTTP {}: {}",
                response.status(),
                response.body()
            )),
            Ok(response) => match extract_content(response.body()) {
                Some(text) => CompletionResult::Success(text),
                None => CompletionResult::MalformedResponse(response.into_body()),
            },
            Err(error) if error.indicates_rate_limit() => CompletionResult::RateLimited,
            Err(error) => CompletionResult::TransportFailure(error.to_string()),
        }
    }
}
