// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the Stratus client.

use std::time::Duration;

use crate::error::{Result, SdkError};
use crate::retry::RetryConfig;

/// Default production API address.
pub const DEFAULT_ADDRESS: &str = "https://app.stratus.cloud";

/// API path prefix appended to the address.
pub const DEFAULT_BASE_PATH: &str = "/api/v2/";

/// Rate limit applied to all outgoing requests of one client instance.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained request rate in tokens per second.
    pub requests_per_second: f64,
    /// Maximum burst above the sustained rate.
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 30.0,
            burst: 10,
        }
    }
}

/// Configuration for [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the API, without the `/api/v2/` prefix.
    pub address: String,
    /// API path prefix resolved against `address`.
    pub base_path: String,
    /// Bearer token used for the `Authorization` header. Required.
    pub token: String,
    /// Underlying HTTP client. When `None` the SDK builds its own with
    /// `request_timeout` applied.
    pub http_client: Option<reqwest::Client>,
    /// Token-bucket parameters shared by all calls on the client.
    pub rate_limit: RateLimitConfig,
    /// Retry behavior for transient failures.
    pub retry: RetryConfig,
    /// Per-request timeout applied to the built-in HTTP client.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            token: String::new(),
            http_client: None,
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STRATUS_ADDRESS`: API base address (default: production endpoint)
    /// - `STRATUS_TOKEN`: API token (required)
    /// - `STRATUS_REQUEST_TIMEOUT_MS`: Request timeout in milliseconds (default: 30000)
    pub fn from_env() -> Result<Self> {
        let address =
            std::env::var("STRATUS_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());

        let token = std::env::var("STRATUS_TOKEN")
            .map_err(|_| SdkError::Config("STRATUS_TOKEN is not set".to_string()))?;

        let request_timeout_ms: u64 = std::env::var("STRATUS_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse()
            .map_err(|e| {
                SdkError::Config(format!("invalid STRATUS_REQUEST_TIMEOUT_MS: {}", e))
            })?;

        Ok(Self {
            address,
            token,
            request_timeout: Duration::from_millis(request_timeout_ms),
            ..Self::default()
        })
    }

    /// Set the API base address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the API token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Use a caller-supplied HTTP client instead of the built-in one.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the rate limit parameters.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Set the retry behavior.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
