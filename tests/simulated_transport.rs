//! Integration tests for the roast client over the simulated transport
//!
//! Covers fault injection, rate limiting by status and by error message,
//! the request log, and abandoning a call mid-latency.

use roastmaster::error::RoastError;
use roastmaster::roast::{
    CompletionResult, CompletionSettings, ConversationHistory, RoastClient, Role, Turn,
};
use roastmaster::transport::{
    CHAT_COMPLETIONS_PATH, Disposition, SimulatedTransport, TransportError, TransportResponse,
};
use std::sync::Arc;
use std::time::Duration;

const CALCULATOR_ROAST: &str =
    "You call this a calculator? My toaster does better arithmetic, and it only knows one number.";

fn client_over(transport: Arc<SimulatedTransport>) -> RoastClient {
    RoastClient::new(transport, CompletionSettings::new("test-model", 200, 0.9))
}

#[tokio::test]
async fn test_success_appends_exactly_two_turns() {
    let transport = Arc::new(SimulatedTransport::new().with_completion(CALCULATOR_ROAST));
    let client = client_over(transport.clone());
    let mut history = ConversationHistory::from(vec![
        Turn::user("fn add(a: i32, b: i32) -> i32 { a - b }"),
        Turn::assistant("Subtraction with extra steps."),
    ]);

    let result = client
        .generate_roast("fn mul(a: i32, b: i32) -> i32 { a + b }", "savage", &mut history)
        .await;

    assert_eq!(result, CompletionResult::Success(CALCULATOR_ROAST.to_string()));
    assert_eq!(history.len(), 4);
    assert_eq!(history.turns()[2].role(), Role::User);
    assert_eq!(history.turns()[3], Turn::assistant(CALCULATOR_ROAST));
    assert_eq!(transport.request_count().await, 1);
}

#[tokio::test]
async fn test_error_rate_one_fails_every_call_and_logs_each() {
    let mut transport = SimulatedTransport::builder()
        .error_rate(1.0)
        .seed(7)
        .build()
        .expect("valid settings");
    transport.respond_with_completion(CHAT_COMPLETIONS_PATH, "never returned");
    let transport = Arc::new(transport);
    let client = client_over(transport.clone());
    let mut history = ConversationHistory::new();

    for _ in 0..5 {
        let result = client.roast("let x = 1;", "light", &mut history).await;
        assert!(
            matches!(result, Err(RoastError::TransportFailure { .. })),
            "expected transport failure, got {:?}",
            result
        );
    }

    let log = transport.request_log().await;
    assert_eq!(log.len(), 5);
    assert!(
        log.iter()
            .all(|entry| entry.disposition() == Disposition::FaultInjected)
    );
    assert!(
        history.turns().iter().all(|turn| turn.role() == Role::User),
        "failed calls must never append assistant turns"
    );
}

#[tokio::test]
async fn test_rate_limited_status_yields_rate_limited_message() {
    let mut transport = SimulatedTransport::new();
    transport.respond_rate_limited(CHAT_COMPLETIONS_PATH);
    let client = client_over(Arc::new(transport));
    let mut history = ConversationHistory::new();

    let result = client.roast("while true {}", "brutal", &mut history).await;

    let err = result.expect_err("429 must not succeed");
    assert_eq!(err, RoastError::RateLimited);
    assert!(err.to_string().contains("rate limit"));
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_rate_limit_carried_by_transport_error_message() {
    let mut transport = SimulatedTransport::new();
    transport.fail_with(
        CHAT_COMPLETIONS_PATH,
        TransportError::Other {
            endpoint: CHAT_COMPLETIONS_PATH.to_string(),
            message: "upstream said: Too Many Requests".to_string(),
        },
    );
    let client = client_over(Arc::new(transport));
    let mut history = ConversationHistory::new();

    let result = client.generate_roast("x", "savage", &mut history).await;

    assert_eq!(result, CompletionResult::RateLimited);
}

#[tokio::test]
async fn test_connect_error_is_transport_failure_with_detail() {
    let mut transport = SimulatedTransport::new();
    transport.fail_with(
        CHAT_COMPLETIONS_PATH,
        TransportError::Connect {
            endpoint: CHAT_COMPLETIONS_PATH.to_string(),
            message: "connection refused".to_string(),
        },
    );
    let client = client_over(Arc::new(transport));
    let mut history = ConversationHistory::new();

    let err = client
        .roast("x", "savage", &mut history)
        .await
        .expect_err("connect errors must fail");

    assert!(matches!(err, RoastError::TransportFailure { .. }));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_unregistered_endpoint_is_not_found_failure() {
    let transport = Arc::new(SimulatedTransport::new());
    let client = client_over(transport.clone());
    let mut history = ConversationHistory::new();

    let result = client.generate_roast("x", "savage", &mut history).await;

    match result {
        CompletionResult::TransportFailure(detail) => assert!(detail.contains("404")),
        other => panic!("expected transport failure, got {:?}", other),
    }
    let log = transport.request_log().await;
    assert_eq!(log[0].disposition(), Disposition::NotFound);
    assert_eq!(log[0].endpoint(), CHAT_COMPLETIONS_PATH);
}

#[tokio::test]
async fn test_success_status_without_content_is_malformed() {
    let mut transport = SimulatedTransport::new();
    transport.respond_with(
        CHAT_COMPLETIONS_PATH,
        TransportResponse::ok(r#"{"choices":[]}"#),
    );
    let client = client_over(Arc::new(transport));
    let mut history = ConversationHistory::new();

    let err = client
        .roast("x", "savage", &mut history)
        .await
        .expect_err("empty choices must fail");

    assert_eq!(
        err,
        RoastError::MalformedResponse {
            raw: r#"{"choices":[]}"#.to_string()
        }
    );
}

#[tokio::test]
async fn test_first_matching_rule_wins() {
    let mut transport = SimulatedTransport::new();
    transport
        .respond_with_completion(CHAT_COMPLETIONS_PATH, "first")
        .respond_with_completion(CHAT_COMPLETIONS_PATH, "second");
    let transport = Arc::new(transport);
    let client = client_over(transport.clone());
    let mut history = ConversationHistory::new();

    let roast = client
        .roast("x", "light", &mut history)
        .await
        .expect("should succeed");

    assert_eq!(roast, "first");
    assert_eq!(
        transport.request_log().await[0].disposition(),
        Disposition::Matched { rule: 0 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_call_appends_only_user_turn() {
    let mut transport = SimulatedTransport::builder()
        .latency(200, 200)
        .seed(1)
        .build()
        .expect("valid settings");
    transport.respond_with_completion(CHAT_COMPLETIONS_PATH, CALCULATOR_ROAST);
    let transport = Arc::new(transport);
    let client = client_over(transport.clone());
    let mut history = ConversationHistory::new();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        client.roast("fn slow() {}", "savage", &mut history),
    )
    .await;

    assert!(outcome.is_err(), "call should be abandoned before latency elapses");
    assert_eq!(history.turns(), &[Turn::user("fn slow() {}")]);

    let log = transport.request_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].latency(), Some(Duration::from_millis(200)));

    // The detached call still finishes; its result is simply discarded.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_same_seed_replays_same_fault_sequence() {
    async fn outcomes(seed: u64) -> Vec<Disposition> {
        let mut transport = SimulatedTransport::builder()
            .error_rate(0.5)
            .seed(seed)
            .build()
            .expect("valid settings");
        transport.respond_with_completion(CHAT_COMPLETIONS_PATH, "ok");
        let transport = Arc::new(transport);
        let client = client_over(transport.clone());
        let mut history = ConversationHistory::new();

        for _ in 0..20 {
            let _ = client.generate_roast("x", "light", &mut history).await;
        }

        transport
            .request_log()
            .await
            .iter()
            .map(|entry| entry.disposition())
            .collect()
    }

    assert_eq!(outcomes(42).await, outcomes(42).await);
}

#[test]
fn test_builder_rejects_inverted_latency_and_bad_error_rate() {
    assert!(SimulatedTransport::builder().latency(200, 50).build().is_err());
    assert!(SimulatedTransport::builder().error_rate(1.5).build().is_err());
    assert!(SimulatedTransport::builder().error_rate(-0.1).build().is_err());
    assert!(
        SimulatedTransport::builder()
            .error_rate(f64::NAN)
            .build()
            .is_err()
    );
    assert!(
        SimulatedTransport::builder()
            .latency(50, 50)
            .error_rate(0.0)
            .build()
            .is_ok()
    );
}
