// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for stratus-sdk.

use thiserror::Error;

/// Result type using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur when using the SDK.
///
/// Every error is surfaced to the immediate caller unchanged; the SDK never
/// recovers or suppresses locally beyond the documented 304-is-success and
/// retry-then-succeed cases.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A relative path could not be resolved against the base address.
    /// Raised during request construction; nothing is sent.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Invalid input (payload/method mismatch, unserializable options).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller's cancellation token fired before or during the call.
    #[error("request cancelled")]
    Cancelled,

    /// Server returned HTTP 401.
    #[error("unauthorized: invalid or missing API token")]
    Unauthorized,

    /// Server returned HTTP 404, regardless of body content.
    #[error("resource not found")]
    NotFound,

    /// Server returned a non-2xx status not covered by a dedicated variant.
    /// Carries the status code and the raw body text for diagnostics.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Server returned 2xx but the body was not a decodable document.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Network-level failure after retries were exhausted.
    #[error("transport error: {0}")]
    Transport(String),

    /// Serialization/deserialization error on the request side.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for SdkError {
    fn from(err: url::ParseError) -> Self {
        SdkError::InvalidPath(err.to_string())
    }
}
