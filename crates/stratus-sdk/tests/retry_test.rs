// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Retry behavior against a flaky mock endpoint and a dead address.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use stratus_mock::MockApi;
use stratus_sdk::{
    CallContext, Client, Config, Destination, Payload, RetryConfig, RetryStrategy, SdkError,
};

fn client_with_retry(address: String, retry: RetryConfig) -> Client {
    Client::new(
        Config::new()
            .with_address(address)
            .with_token("test-token")
            .with_retry(retry),
    )
    .unwrap()
}

fn counting_context() -> (CallContext, Arc<AtomicUsize>) {
    let observed = Arc::new(AtomicUsize::new(0));
    let seen = observed.clone();
    let ctx = CallContext::new().with_observer(move |_status, _headers| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (ctx, observed)
}

/// An address nothing listens on. Binding then dropping the listener keeps
/// the port free long enough for the connection to be refused.
fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn transient_status_is_retried_until_success() {
    let mock = MockApi::spawn().await;
    let client = client_with_retry(
        mock.base_url(),
        RetryConfig::new(2, 10, RetryStrategy::ExponentialBackoff),
    );
    let (ctx, observed) = counting_context();

    let request = client
        .build_request::<()>(Method::GET, "fail/steady/2", Payload::none())
        .unwrap();
    let mut slot: Option<stratus_sdk::Resource<Value>> = None;
    client
        .execute(&ctx, request, Destination::Single(&mut slot))
        .await
        .unwrap();

    // Two 503s, then the 200: one observation and one wire request each.
    assert_eq!(slot.unwrap().kind, "pings");
    assert_eq!(observed.load(Ordering::SeqCst), 3);
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn transient_status_is_retried_for_non_idempotent_methods_too() {
    let mock = MockApi::spawn().await;
    let client = client_with_retry(
        mock.base_url(),
        RetryConfig::new(1, 10, RetryStrategy::ExponentialBackoff),
    );
    let ctx = CallContext::new();

    let request = client
        .build_request::<()>(Method::POST, "fail/posted/1", Payload::none())
        .unwrap();
    client
        .execute::<()>(&ctx, request, Destination::Ignore)
        .await
        .unwrap();
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn exhausted_retries_surface_the_final_status() {
    let mock = MockApi::spawn().await;
    let client = client_with_retry(
        mock.base_url(),
        RetryConfig::new(1, 10, RetryStrategy::ExponentialBackoff),
    );
    let (ctx, observed) = counting_context();

    let request = client
        .build_request::<()>(Method::GET, "fail/hopeless/10", Payload::none())
        .unwrap();
    let err = client
        .execute::<()>(&ctx, request, Destination::Ignore)
        .await
        .unwrap_err();

    match err {
        SdkError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("try again"));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
    // Initial attempt plus one retry.
    assert_eq!(observed.load(Ordering::SeqCst), 2);
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn transport_failure_on_post_is_not_retried() {
    let client = client_with_retry(
        dead_address(),
        RetryConfig::new(3, 2_000, RetryStrategy::ExponentialBackoff),
    );
    let ctx = CallContext::new();

    let request = client
        .build_request::<()>(Method::POST, "ping", Payload::none())
        .unwrap();
    let started = Instant::now();
    let err = client
        .execute::<()>(&ctx, request, Destination::Ignore)
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Transport(_)));
    // A retried POST would have slept through at least one 2s backoff.
    assert!(started.elapsed() < Duration::from_millis(1_500));
}

#[tokio::test]
async fn transport_failure_on_get_is_retried() {
    let client = client_with_retry(
        dead_address(),
        RetryConfig::new(2, 20, RetryStrategy::ExponentialBackoff),
    );
    let ctx = CallContext::new();

    let request = client
        .build_request::<()>(Method::GET, "ping", Payload::none())
        .unwrap();
    let started = Instant::now();
    let err = client
        .execute::<()>(&ctx, request, Destination::Ignore)
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Transport(_)));
    // Backoffs of 20ms and 40ms sit between the three connection attempts.
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn disabled_retry_gives_up_on_first_transient_status() {
    let mock = MockApi::spawn().await;
    let client = client_with_retry(mock.base_url(), RetryConfig::disabled());
    let ctx = CallContext::new();

    let request = client
        .build_request::<()>(Method::GET, "fail/once/1", Payload::none())
        .unwrap();
    let err = client
        .execute::<()>(&ctx, request, Destination::Ignore)
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::UnexpectedStatus { status: 503, .. }));
    assert_eq!(mock.hits(), 1);
}
