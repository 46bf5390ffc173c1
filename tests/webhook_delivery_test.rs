//! Webhook delivery tests against a mock n8n endpoint.
//!
//! Runs `post_report` against wiremock to verify:
//! - 2xx delivery, with and without a response body
//! - Rejections carrying the endpoint's status and diagnostic text
//! - Timeout and connection failures
//! - The exact payload and headers the endpoint receives

mod common;

use std::time::Duration;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use curt::core::webhook::{DEFAULT_TIMEOUT, build_client, post_report};
use curt::error::CurtError;
use curt::test_utils::make_test_report;

use common::logger::TestLogger;

// =============================================================================
// Successful Delivery Tests
// =============================================================================

#[tokio::test]
async fn delivery_returns_the_response_body() {
    let log = TestLogger::new("delivery_returns_the_response_body");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Workflow was started"))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    let report = make_test_report();
    let response = post_report(&client, &url, &report, DEFAULT_TIMEOUT)
        .await
        .expect("delivery should succeed");

    log.phase("verify");
    assert_eq!(response.as_deref(), Some("Workflow was started"));
    log.finish_ok();
}

#[tokio::test]
async fn empty_response_body_maps_to_none() {
    let log = TestLogger::new("empty_response_body_maps_to_none");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    let response = post_report(&client, &url, &make_test_report(), DEFAULT_TIMEOUT)
        .await
        .expect("delivery should succeed");

    log.phase("verify");
    assert_eq!(response, None, "whitespace-only body should become None");
    log.finish_ok();
}

#[tokio::test]
async fn no_content_status_counts_as_delivered() {
    let log = TestLogger::new("no_content_status_counts_as_delivered");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    let response = post_report(&client, &url, &make_test_report(), DEFAULT_TIMEOUT)
        .await
        .expect("any 2xx should count as delivered");

    log.phase("verify");
    assert_eq!(response, None);
    log.finish_ok();
}

// =============================================================================
// Request Shape Tests
// =============================================================================

#[tokio::test]
async fn payload_arrives_exactly_as_built() {
    let log = TestLogger::new("payload_arrives_exactly_as_built");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    let report = make_test_report();

    // The mock only answers a POST whose JSON body equals the report.
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .and(header("content-type", "application/json"))
        .and(body_json(&report))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    post_report(&client, &url, &report, DEFAULT_TIMEOUT)
        .await
        .expect("matching payload should be accepted");

    log.phase("verify");
    log.finish_ok();
}

#[tokio::test]
async fn requests_identify_the_crate_in_user_agent() {
    let log = TestLogger::new("requests_identify_the_crate_in_user_agent");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .and(header(
            "User-Agent",
            format!("curt/{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    post_report(&client, &url, &make_test_report(), DEFAULT_TIMEOUT)
        .await
        .expect("request should match the UA expectation");

    log.phase("verify");
    log.finish_ok();
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[tokio::test]
async fn rejection_carries_status_and_body() {
    let log = TestLogger::new("rejection_carries_status_and_body");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(404).set_body_string("workflow not found\n"))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    let result = post_report(&client, &url, &make_test_report(), DEFAULT_TIMEOUT).await;

    log.phase("verify");
    match result.unwrap_err() {
        CurtError::WebhookRejected { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "workflow not found");
        }
        other => panic!("Expected WebhookRejected, got: {other:?}"),
    }
    log.finish_ok();
}

#[tokio::test]
async fn server_errors_are_retryable_client_errors_are_not() {
    let log = TestLogger::new("server_errors_are_retryable_client_errors_are_not");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream restarting"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let client = build_client(DEFAULT_TIMEOUT).expect("client build");
    let report = make_test_report();

    let flaky = post_report(
        &client,
        &format!("{}/flaky", mock_server.uri()),
        &report,
        DEFAULT_TIMEOUT,
    )
    .await
    .unwrap_err();
    let gone = post_report(
        &client,
        &format!("{}/gone", mock_server.uri()),
        &report,
        DEFAULT_TIMEOUT,
    )
    .await
    .unwrap_err();

    log.phase("verify");
    assert!(flaky.is_retryable(), "a 5xx rejection is worth retrying");
    assert!(!gone.is_retryable(), "a 4xx rejection will not improve");
    log.finish_ok();
}

// =============================================================================
// Timeout and Network Tests
// =============================================================================

#[tokio::test]
async fn slow_endpoint_times_out_with_the_configured_duration() {
    let log = TestLogger::new("slow_endpoint_times_out_with_the_configured_duration");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    log.phase("execute");
    let timeout = Duration::from_secs(1);
    let client = build_client(timeout).expect("client build");
    let url = format!("{}/webhook/usage", mock_server.uri());
    log.info("Posting with a 1s timeout to a 5s endpoint");
    let result = post_report(&client, &url, &make_test_report(), timeout).await;

    log.phase("verify");
    match result.unwrap_err() {
        // The error reports the timeout that actually applied, not a default.
        CurtError::Timeout(secs) => assert_eq!(secs, 1),
        other => panic!("Expected Timeout, got: {other:?}"),
    }
    log.finish_ok();
}

#[tokio::test]
async fn connection_refused_maps_to_network_error() {
    let log = TestLogger::new("connection_refused_maps_to_network_error");
    log.phase("execute");

    // A port that's definitely not listening.
    let client = build_client(Duration::from_secs(2)).expect("client build");
    let result = post_report(
        &client,
        "http://127.0.0.1:59999/webhook/usage",
        &make_test_report(),
        Duration::from_secs(2),
    )
    .await;

    log.phase("verify");
    match result.unwrap_err() {
        CurtError::Network(msg) => log.debug(&format!("Got expected network error: {msg}")),
        other => panic!("Expected Network error, got: {other:?}"),
    }
    log.finish_ok();
}
