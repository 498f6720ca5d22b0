//! Production transport: JSON POST to an OpenAI-compatible provider

use super::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::REQUEST_ID_HEADER;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Provider routing header carrying the referring site
pub const REFERER_HEADER: &str = "HTTP-Referer";

/// Provider routing header carrying the application title
pub const TITLE_HEADER: &str = "X-Title";

/// [`Transport`] backed by a pooled `reqwest::Client`
///
/// Credentials and routing headers are resolved once at construction and
/// reused for every call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    routing_headers: Vec<(&'static str, String)>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport for the configured provider
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be constructed
    /// (e.g. TLS backend initialisation failure).
    pub fn new(provider: &ProviderConfig, api_key: String) -> AppResult<Self> {
        let timeout = Duration::from_secs(provider.timeout_seconds());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let mut routing_headers = Vec::new();
        if let Some(referer) = provider.referer() {
            routing_headers.push((REFERER_HEADER, referer.to_string()));
        }
        if let Some(title) = provider.title() {
            routing_headers.push((TITLE_HEADER, title.to_string()));
        }

        Ok(Self {
            http,
            base_url: provider.base_url().trim_end_matches('/').to_string(),
            api_key,
            routing_headers,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, error: reqwest::Error, endpoint: &str) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            TransportError::Connect {
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            }
        } else {
            TransportError::Other {
                endpoint: endpoint.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.endpoint());

        let mut builder = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request.request_id().to_string())
            .body(request.body().to_string());

        for (name, value) in &self.routing_headers {
            builder = builder.header(*name, value);
        }

        tracing::debug!(
            request_id = %request.request_id(),
            url = %url,
            body_length = request.body().len(),
            "Sending chat-completion request"
        );

        let response = builder.send().await.map_err(|e| {
            let error = self.map_error(e, request.endpoint());
            tracing::error!(
                request_id = %request.request_id(),
                url = %url,
                error = %error,
                "Chat-completion request failed before a response was received"
            );
            error
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_error(e, request.endpoint()))?;

        tracing::debug!(
            request_id = %request.request_id(),
            status = status,
            body_length = body.len(),
            "Received chat-completion response"
        );

        Ok(TransportResponse::new(status, body))
    }
}
