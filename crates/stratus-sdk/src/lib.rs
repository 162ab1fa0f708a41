// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Stratus SDK - typed client for the Stratus infrastructure-management API.
//!
//! This crate provides the shared request pipeline every resource operation
//! goes through: request construction with query/document encoding, a
//! client-wide token-bucket rate limiter, bounded retry with exponential
//! backoff, cancellation at every suspension point, and typed decoding of
//! JSON-API shaped response documents. Resource wrappers (organizations,
//! workspaces) are thin methods over [`Client::build_request`] and
//! [`Client::execute`].
//!
//! # Quick Start
//!
//! ```ignore
//! use stratus_sdk::{CallContext, Client, Config, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> stratus_sdk::Result<()> {
//!     let client = Client::from_env()?;
//!     let ctx = CallContext::new();
//!
//!     let page = client
//!         .workspaces()
//!         .list(&ctx, "acme", Default::default())
//!         .await?;
//!     for workspace in &page.items {
//!         println!("{}: {}", workspace.id(), workspace.attributes.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Cancellation
//!
//! Every call takes a [`CallContext`]. Attach a
//! `tokio_util::sync::CancellationToken` and cancel it to abort the call at
//! the next suspension point: rate-limiter wait, network send, retry
//! backoff, or body read.
//!
//! ```ignore
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let ctx = CallContext::new().with_cancellation(token.clone());
//! tokio::spawn(async move { token.cancel() });
//! match client.organizations().list(&ctx, Default::default()).await {
//!     Err(stratus_sdk::SdkError::Cancelled) => {}
//!     other => { /* ... */ }
//! }
//! ```
//!
//! # Retry
//!
//! Transient statuses (429, 502, 503, 504) are retried for any method up to
//! `RetryConfig::max_retries` extra attempts with exponential backoff;
//! ambiguous network failures are retried for idempotent methods only.
//! Attach a response observer through the context to watch every attempt:
//!
//! ```ignore
//! let ctx = CallContext::new()
//!     .with_observer(|status, _headers| tracing::debug!(status, "response received"));
//! ```
//!
//! # Configuration
//!
//! ## Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `STRATUS_TOKEN` | Yes | - | API token |
//! | `STRATUS_ADDRESS` | No | `https://app.stratus.cloud` | API base address |
//! | `STRATUS_REQUEST_TIMEOUT_MS` | No | `30000` | Request timeout |
//!
//! ## Programmatic Configuration
//!
//! ```ignore
//! use stratus_sdk::{Config, RateLimitConfig, RetryConfig, RetryStrategy};
//!
//! let config = Config::new()
//!     .with_address("https://stratus.internal.example")
//!     .with_token("t0k3n")
//!     .with_rate_limit(RateLimitConfig { requests_per_second: 10.0, burst: 5 })
//!     .with_retry(RetryConfig::new(3, 250, RetryStrategy::ExponentialBackoff));
//! let client = stratus_sdk::Client::new(config)?;
//! ```

mod client;
mod config;
mod context;
mod document;
mod error;
mod limiter;
mod pagination;
mod resources;
mod retry;

// Main types
pub use client::{Client, DOCUMENT_CONTENT_TYPE, Destination, Payload};
pub use config::{Config, DEFAULT_ADDRESS, DEFAULT_BASE_PATH, RateLimitConfig};
pub use context::CallContext;
pub use error::{Result, SdkError};
pub use retry::{RetryConfig, RetryStrategy};

// Wire format
pub use document::{
    CollectionDocument, CollectionMeta, Document, Relationship, RelationshipData, Resource,
    ResourceIdentifier,
};
pub use pagination::{ListOptions, Page, Pagination};

// Resource wrappers
pub use resources::{
    Organization, OrganizationAttributes, OrganizationCreateOptions, OrganizationUpdateOptions,
    Organizations, Workspace, WorkspaceAttributes, WorkspaceCreateOptions, WorkspaceListOptions,
    WorkspaceUpdateOptions, Workspaces,
};

// Re-export the cancellation token type used by CallContext
pub use tokio_util::sync::CancellationToken;
