//! Simulated transport for exercising the client without a network
//!
//! Supports uniform latency in `[min_ms, max_ms]`, a random fault rate, ordered
//! per-endpoint response rules, and a chronological request log. All random
//! draws come from one injectable generator, so a fixed seed replays the exact
//! same latency and fault sequence.
//!
//! Per call, in order:
//! 1. draw the latency (only when latency is enabled)
//! 2. draw the fault value; below `error_rate` means an injected 500
//! 3. otherwise pick the first rule whose matcher accepts the request, or 404
//! 4. append the log entry, sleep, then produce the response
//!
//! The log entry is written before sleeping so that a caller abandoning the
//! call mid-latency still leaves a record.

use super::{
    CHAT_COMPLETIONS_PATH, STATUS_TOO_MANY_REQUESTS, Transport, TransportError, TransportRequest,
    TransportResponse,
};
use crate::error::{AppError, AppResult};
use crate::roast::envelope::completion_envelope;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use uuid::Uuid;

type Matcher = Arc<dyn Fn(&TransportRequest) -> bool + Send + Sync>;
type Responder =
    Arc<dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync>;

/// Status returned for injected faults
pub const FAULT_STATUS: u16 = 500;

/// Status returned when no rule matches
pub const NOT_FOUND_STATUS: u16 = 404;

/// A matcher/responder pair; rules are tried in registration order
#[derive(Clone)]
pub struct MockRule {
    matcher: Matcher,
    responder: Responder,
}

impl MockRule {
    /// Rule with an arbitrary predicate over the request
    pub fn new<M, R>(matcher: M, responder: R) -> Self
    where
        M: Fn(&TransportRequest) -> bool + Send + Sync + 'static,
        R: Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
            responder: Arc::new(responder),
        }
    }

    /// Rule matching one endpoint path exactly
    pub fn for_endpoint<R>(endpoint: impl Into<String>, responder: R) -> Self
    where
        R: Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        let endpoint = endpoint.into();
        Self::new(move |request| request.endpoint() == endpoint, responder)
    }

    pub fn matches(&self, request: &TransportRequest) -> bool {
        (self.matcher)(request)
    }

    pub fn respond(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (self.responder)(request)
    }
}

impl std::fmt::Debug for MockRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRule").finish_non_exhaustive()
    }
}

/// How a logged call was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Answered by the rule at this registration index
    Matched { rule: usize },
    /// Fault injection fired; rules were not consulted
    FaultInjected,
    /// No rule matched
    NotFound,
}

/// One audited call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLogEntry {
    timestamp: SystemTime,
    endpoint: String,
    request_id: Uuid,
    latency: Option<Duration>,
    disposition: Disposition,
}

impl RequestLogEntry {
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Simulated latency applied to this call, if latency was enabled
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    pub fn disposition(&self) -> Disposition {
        self.disposition
    }
}

/// Builder for [`SimulatedTransport`]
#[derive(Default)]
pub struct SimulatedTransportBuilder {
    latency: Option<(u64, u64)>,
    error_rate: f64,
    rng: Option<Box<dyn RngCore + Send>>,
    rules: Vec<MockRule>,
}

impl SimulatedTransportBuilder {
    /// Enable latency drawn uniformly from `[min_ms, max_ms]`
    pub fn latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency = Some((min_ms, max_ms));
        self
    }

    /// Probability in `[0.0, 1.0]` that a call returns an injected fault
    pub fn error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Seed the random source for reproducible sequences
    pub fn seed(self, seed: u64) -> Self {
        self.rng(StdRng::seed_from_u64(seed))
    }

    /// Use a caller-supplied random source
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn rule(mut self, rule: MockRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Validate settings and build the transport
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `min_ms > max_ms` or the error rate is
    /// outside `[0.0, 1.0]` (NaN included).
    pub fn build(self) -> AppResult<SimulatedTransport> {
        if let Some((min_ms, max_ms)) = self.latency
            && min_ms > max_ms
        {
            return Err(AppError::Config(format!(
                "simulated latency min ({}ms) exceeds max ({}ms)",
                min_ms, max_ms
            )));
        }

        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(AppError::Config(format!(
                "simulated error_rate must be between 0.0 and 1.0, got {}",
                self.error_rate
            )));
        }

        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_os_rng()));

        Ok(SimulatedTransport {
            latency: self.latency,
            error_rate: self.error_rate,
            rules: self.rules,
            rng: Mutex::new(rng),
            log: Mutex::new(Vec::new()),
        })
    }
}

/// In-process stand-in for the provider
///
/// Register rules while the value is still exclusively owned, then share it
/// (typically as `Arc<dyn Transport>`). The rule set is read-only once shared.
pub struct SimulatedTransport {
    latency: Option<(u64, u64)>,
    error_rate: f64,
    rules: Vec<MockRule>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    log: Mutex<Vec<RequestLogEntry>>,
}

impl SimulatedTransport {
    pub fn builder() -> SimulatedTransportBuilder {
        SimulatedTransportBuilder::default()
    }

    /// No latency, no faults, no rules
    pub fn new() -> Self {
        Self {
            latency: None,
            error_rate: 0.0,
            rules: Vec::new(),
            rng: Mutex::new(Box::new(StdRng::from_os_rng())),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Append a rule; earlier rules take precedence
    pub fn register(&mut self, rule: MockRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Always answer `endpoint` with a fixed response
    pub fn respond_with(&mut self, endpoint: &str, response: TransportResponse) -> &mut Self {
        self.register(MockRule::for_endpoint(endpoint, move |_| Ok(response.clone())))
    }

    /// Answer `endpoint` with a well-formed chat completion carrying `content`
    pub fn respond_with_completion(&mut self, endpoint: &str, content: &str) -> &mut Self {
        self.respond_with(endpoint, TransportResponse::ok(completion_envelope(content)))
    }

    /// Answer `endpoint` with HTTP 429
    pub fn respond_rate_limited(&mut self, endpoint: &str) -> &mut Self {
        self.respond_with(endpoint, rate_limit_response())
    }

    /// Compute the response for `endpoint` per request
    pub fn respond_dynamic<F>(&mut self, endpoint: &str, responder: F) -> &mut Self
    where
        F: Fn(&TransportRequest) -> TransportResponse + Send + Sync + 'static,
    {
        self.register(MockRule::for_endpoint(endpoint, move |request| {
            Ok(responder(request))
        }))
    }

    /// Make calls to `endpoint` fail at the transport level with `error`
    pub fn fail_with(&mut self, endpoint: &str, error: TransportError) -> &mut Self {
        self.register(MockRule::for_endpoint(endpoint, move |_| Err(error.clone())))
    }

    /// Shorthand for a canned completion on [`CHAT_COMPLETIONS_PATH`]
    pub fn with_completion(mut self, content: &str) -> Self {
        self.respond_with_completion(CHAT_COMPLETIONS_PATH, content);
        self
    }

    /// Ordered snapshot of every call made so far
    pub async fn request_log(&self) -> Vec<RequestLogEntry> {
        self.log.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.log.lock().await.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let timestamp = SystemTime::now();

        let (latency, fault) = {
            let mut rng = self.rng.lock().await;
            let latency = self
                .latency
                .map(|(min_ms, max_ms)| Duration::from_millis(rng.random_range(min_ms..=max_ms)));
            let fault = rng.random::<f64>() < self.error_rate;
            (latency, fault)
        };

        let disposition = if fault {
            Disposition::FaultInjected
        } else {
            match self.rules.iter().position(|rule| rule.matches(request)) {
                Some(rule) => Disposition::Matched { rule },
                None => Disposition::NotFound,
            }
        };

        self.log.lock().await.push(RequestLogEntry {
            timestamp,
            endpoint: request.endpoint().to_string(),
            request_id: request.request_id(),
            latency,
            disposition,
        });

        tracing::debug!(
            request_id = %request.request_id(),
            endpoint = %request.endpoint(),
            latency_ms = latency.map(|l| l.as_millis() as u64),
            disposition = ?disposition,
            "Simulated transport call"
        );

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match disposition {
            Disposition::FaultInjected => {
                tracing::warn!(
                    request_id = %request.request_id(),
                    endpoint = %request.endpoint(),
                    error_rate = self.error_rate,
                    "Injected simulated transport fault"
                );
                Ok(fault_response())
            }
            Disposition::NotFound => Ok(not_found_response(request.endpoint())),
            Disposition::Matched { rule } => self.rules[rule].respond(request),
        }
    }
}

fn error_body(message: &str, code: u16) -> String {
    serde_json::json!({ "error": { "message": message, "code": code } }).to_string()
}

/// Canned provider rate-limit response
pub fn rate_limit_response() -> TransportResponse {
    TransportResponse::new(
        STATUS_TOO_MANY_REQUESTS,
        error_body(
            "Rate limit exceeded: too many requests per minute",
            STATUS_TOO_MANY_REQUESTS,
        ),
    )
}

fn fault_response() -> TransportResponse {
    TransportResponse::new(
        FAULT_STATUS,
        error_body("Simulated transport failure", FAULT_STATUS),
    )
}

fn not_found_response(endpoint: &str) -> TransportResponse {
    TransportResponse::new(
        NOT_FOUND_STATUS,
        error_body(
            &format!("No simulated rule matches {}", endpoint),
            NOT_FOUND_STATUS,
        ),
    )
}
