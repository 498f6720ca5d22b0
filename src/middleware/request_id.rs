//! Request correlation ids
//!
//! A caller-supplied `x-request-id` is kept when it parses as a UUID; anything
//! else is replaced with a fresh v4 id. The id travels in request extensions,
//! wraps the rest of the request in a tracing span, and is echoed on the
//! response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one HTTP request, available as an Axum extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    fn from_header(value: Option<&HeaderValue>) -> Option<Self> {
        let text = value?.to_str().ok()?;
        Uuid::parse_str(text.trim()).ok().map(Self)
    }

    fn to_header_value(self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0.hyphenated().to_string()).ok()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let supplied = RequestId::from_header(request.headers().get(REQUEST_ID_HEADER));
    let request_id = supplied.unwrap_or_default();

    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    span.in_scope(|| {
        tracing::debug!(caller_supplied_id = supplied.is_some(), "Incoming request");
    });

    request.extensions_mut().insert(request_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = request_id.to_header_value() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
