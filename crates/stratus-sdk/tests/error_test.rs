// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error display and conversion coverage.

use stratus_sdk::SdkError;

#[test]
fn error_display_messages() {
    assert_eq!(
        SdkError::Config("token is required".to_string()).to_string(),
        "configuration error: token is required"
    );
    assert_eq!(
        SdkError::InvalidPath("/absolute".to_string()).to_string(),
        "invalid path: /absolute"
    );
    assert_eq!(
        SdkError::InvalidInput("query payload requires GET".to_string()).to_string(),
        "invalid input: query payload requires GET"
    );
    assert_eq!(SdkError::Cancelled.to_string(), "request cancelled");
    assert_eq!(
        SdkError::Unauthorized.to_string(),
        "unauthorized: invalid or missing API token"
    );
    assert_eq!(SdkError::NotFound.to_string(), "resource not found");
    assert_eq!(
        SdkError::UnexpectedStatus {
            status: 500,
            body: "boom".to_string()
        }
        .to_string(),
        "unexpected HTTP status 500: boom"
    );
    assert_eq!(
        SdkError::MalformedResponse("expected value".to_string()).to_string(),
        "malformed response: expected value"
    );
    assert_eq!(
        SdkError::Transport("connection refused".to_string()).to_string(),
        "transport error: connection refused"
    );
    assert_eq!(
        SdkError::Serialization("key must be a string".to_string()).to_string(),
        "serialization error: key must be a string"
    );
}

#[test]
fn serde_json_errors_convert_to_serialization() {
    let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let sdk: SdkError = err.into();
    assert!(matches!(sdk, SdkError::Serialization(_)));
}

#[tokio::test]
async fn reqwest_errors_convert_to_transport() {
    // An unparseable URL surfaces as a builder error at send time, with no
    // network involved.
    let err = reqwest::Client::new()
        .get("not a url")
        .send()
        .await
        .unwrap_err();
    let sdk: SdkError = err.into();
    assert!(matches!(sdk, SdkError::Transport(_)));
}

#[test]
fn url_parse_errors_convert_to_invalid_path() {
    let err = url::Url::parse("::not a url::").unwrap_err();
    let sdk: SdkError = err.into();
    assert!(matches!(sdk, SdkError::InvalidPath(_)));
}
