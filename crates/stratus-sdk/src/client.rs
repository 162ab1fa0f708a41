// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The request pipeline: construction, rate limiting, retry, decode.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::context::CallContext;
use crate::document::{self, Document, Resource};
use crate::error::{Result, SdkError};
use crate::limiter::RateLimiter;
use crate::pagination::Page;
use crate::resources::{Organizations, Workspaces};
use crate::retry::{self, RetryConfig};

/// Media type for structured document bodies.
pub const DOCUMENT_CONTENT_TYPE: &str = "application/vnd.api+json";

const CLIENT_IDENTIFIER: &str = concat!("stratus-sdk-rust/", env!("CARGO_PKG_VERSION"));

/// Value attached to an outgoing request.
///
/// The tag decides the encoding: GET requests carry their value as URL query
/// parameters and never a body; mutating requests carry theirs as a
/// single-resource document body.
#[derive(Debug)]
pub enum Payload<'a, V: Serialize + ?Sized = ()> {
    /// No query string and no body.
    Empty,
    /// Encode the value's fields as URL query parameters. GET only.
    Query(&'a V),
    /// Serialize the value as the `attributes` of a document body.
    /// Mutating methods only.
    Resource {
        /// Resource type tag, e.g. `"workspaces"`.
        kind: &'static str,
        /// Identifier for updates addressing an existing resource.
        id: Option<&'a str>,
        value: &'a V,
    },
}

impl Payload<'static, ()> {
    /// An empty payload without a value type to name.
    pub fn none() -> Self {
        Payload::Empty
    }
}

/// Where a successful response body goes.
///
/// Resolved once at the top of the decode step; errors are classified the
/// same way for every variant.
pub enum Destination<'a, T> {
    /// Discard the body.
    Ignore,
    /// Decode a single-resource document into the slot. A 304 response
    /// leaves the slot untouched.
    Single(&'a mut Option<Resource<T>>),
    /// Decode a collection document, preserving server order.
    Collection(&'a mut Page<T>),
    /// Copy the raw body bytes verbatim, with no structured decode.
    Raw(&'a mut Vec<u8>),
}

/// Client for the Stratus API.
///
/// Cheap to clone is not a goal; share one instance (e.g. behind an `Arc`)
/// so all callers go through the same rate limiter.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    limiter: Arc<RateLimiter>,
    retry: RetryConfig,
}

impl Client {
    /// Create a new client with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        if config.token.is_empty() {
            return Err(SdkError::Config("API token is required".to_string()));
        }

        let address = Url::parse(&config.address)
            .map_err(|e| SdkError::Config(format!("invalid address {}: {}", config.address, e)))?;
        let mut base_url = address
            .join(config.base_path.trim_start_matches('/'))
            .map_err(|e| SdkError::Config(format!("invalid base path: {}", e)))?;
        // The base must end with a slash or relative joins drop its last
        // segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = match config.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .map_err(|e| SdkError::Config(format!("failed to build HTTP client: {}", e)))?,
        };

        Ok(Self {
            http,
            base_url,
            token: config.token,
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            retry: config.retry,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Organization operations.
    pub fn organizations(&self) -> Organizations<'_> {
        Organizations::new(self)
    }

    /// Workspace operations.
    pub fn workspaces(&self) -> Workspaces<'_> {
        Workspaces::new(self)
    }

    /// Build an executable request. Pure construction; no network I/O.
    ///
    /// The path is resolved relative to the configured base address; a path
    /// that cannot be resolved fails with [`SdkError::InvalidPath`]. The
    /// bearer token and client identifier headers are always attached.
    pub fn build_request<V: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Payload<'_, V>,
    ) -> Result<Request> {
        if path.starts_with('/') {
            return Err(SdkError::InvalidPath(format!(
                "path {} must be relative to the API root",
                path
            )));
        }
        let url = self
            .base_url
            .join(path)
            .map_err(|e| SdkError::InvalidPath(format!("{}: {}", path, e)))?;

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(USER_AGENT, CLIENT_IDENTIFIER);

        match payload {
            Payload::Empty => {}
            Payload::Query(value) => {
                if method != Method::GET {
                    return Err(SdkError::InvalidInput(format!(
                        "query payloads require GET, got {}",
                        method
                    )));
                }
                builder = builder.query(value);
            }
            Payload::Resource { kind, id, value } => {
                if method == Method::GET {
                    return Err(SdkError::InvalidInput(
                        "document payloads require a mutating method".to_string(),
                    ));
                }
                let mut resource = Resource::new(kind, value);
                if let Some(id) = id {
                    resource = resource.with_id(id);
                }
                let body = serde_json::to_vec(&Document { data: resource })?;
                builder = builder
                    .header(CONTENT_TYPE, DOCUMENT_CONTENT_TYPE)
                    .body(body);
            }
        }

        builder
            .build()
            .map_err(|e| SdkError::InvalidInput(e.to_string()))
    }

    /// Execute a built request and decode the response into `destination`.
    ///
    /// The call suspends on the shared rate limiter, the network send, retry
    /// backoff, and the body read; all four honor the context's cancellation
    /// token.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        request: Request,
        destination: Destination<'_, T>,
    ) -> Result<()> {
        let response = self.send(ctx, request).await?;
        let status = response.status();

        // Conditional-read flows: success, nothing to decode.
        if status == StatusCode::NOT_MODIFIED {
            return Ok(());
        }

        let bytes = tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => return Err(SdkError::Cancelled),
            body = response.bytes() => body?,
        };

        match status {
            StatusCode::UNAUTHORIZED => return Err(SdkError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(SdkError::NotFound),
            status if !status.is_success() => {
                return Err(SdkError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
            _ => {}
        }

        match destination {
            Destination::Ignore => {}
            Destination::Raw(sink) => sink.extend_from_slice(&bytes),
            Destination::Single(slot) => *slot = Some(document::decode_single(&bytes)?),
            Destination::Collection(page) => {
                let collection = document::decode_collection(&bytes)?;
                page.items = collection.data;
                page.pagination = collection.meta.and_then(|meta| meta.pagination);
            }
        }
        Ok(())
    }

    /// Fetch the raw bytes at `path` through the pipeline.
    pub async fn download(&self, ctx: &CallContext, path: &str) -> Result<Vec<u8>> {
        let request = self.build_request(Method::GET, path, Payload::none())?;
        let mut sink = Vec::new();
        self.execute::<()>(ctx, request, Destination::Raw(&mut sink))
            .await?;
        Ok(sink)
    }

    /// Gate one request through the limiter and the bounded retry loop.
    ///
    /// Each wire attempt spends a limiter token. Transient statuses retry any
    /// method; ambiguous transport failures retry idempotent methods only.
    /// The observer fires once per received response, before classification.
    async fn send(&self, ctx: &CallContext, request: Request) -> Result<reqwest::Response> {
        let method = request.method().clone();
        let mut attempt: u32 = 0;
        loop {
            // Retries resend the same path and body, unchanged.
            let attempt_request = request.try_clone().ok_or_else(|| {
                SdkError::InvalidInput("streaming request bodies cannot be retried".to_string())
            })?;

            self.limiter.acquire(ctx.cancellation()).await?;

            let outcome = tokio::select! {
                biased;
                _ = ctx.cancellation().cancelled() => return Err(SdkError::Cancelled),
                outcome = self.http.execute(attempt_request) => outcome,
            };
            attempt += 1;

            match outcome {
                Ok(response) => {
                    ctx.observe_response(response.status().as_u16(), response.headers());
                    let status = response.status();
                    if retry::is_transient(status) && attempt <= self.retry.max_retries {
                        debug!(%method, %status, attempt, "transient status, retrying");
                        self.backoff(ctx, attempt).await?;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    // Cancellation takes precedence over the transport error.
                    if ctx.is_cancelled() {
                        return Err(SdkError::Cancelled);
                    }
                    if retry::is_idempotent(&method) && attempt <= self.retry.max_retries {
                        warn!(%method, error = %e, attempt, "transport failure, retrying");
                        self.backoff(ctx, attempt).await?;
                        continue;
                    }
                    return Err(SdkError::Transport(e.to_string()));
                }
            }
        }
    }

    async fn backoff(&self, ctx: &CallContext, attempt: u32) -> Result<()> {
        let delay = self.retry.delay_for_attempt(attempt);
        tokio::select! {
            biased;
            _ = ctx.cancellation().cancelled() => Err(SdkError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::ListOptions;
    use serde_json::json;

    fn client() -> Client {
        Client::new(
            Config::new()
                .with_address("https://stratus.example.com")
                .with_token("test-token"),
        )
        .unwrap()
    }

    #[test]
    fn new_requires_a_token() {
        let err = Client::new(Config::new()).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn new_rejects_unparseable_address() {
        let config = Config::new().with_address("not a url").with_token("t");
        let err = Client::new(config).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn get_request_carries_auth_and_identifier_headers() {
        let request = client()
            .build_request::<()>(Method::GET, "organizations", Payload::none())
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://stratus.example.com/api/v2/organizations"
        );
        assert_eq!(
            request.headers()[AUTHORIZATION.as_str()],
            "Bearer test-token"
        );
        assert!(
            request.headers()[USER_AGENT.as_str()]
                .to_str()
                .unwrap()
                .starts_with("stratus-sdk-rust/")
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn get_request_encodes_pagination_query() {
        let options = ListOptions::new().with_page_number(2).with_page_size(50);
        let request = client()
            .build_request(
                Method::GET,
                "organizations/acme/workspaces",
                Payload::Query(&options),
            )
            .unwrap();
        assert_eq!(
            request.url().query(),
            Some("page%5Bnumber%5D=2&page%5Bsize%5D=50")
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn unset_pagination_fields_stay_out_of_the_query() {
        let request = client()
            .build_request(
                Method::GET,
                "organizations",
                Payload::Query(&ListOptions::new()),
            )
            .unwrap();
        assert!(request.url().query().unwrap_or("").is_empty());
        assert!(!request.url().as_str().contains("page"));
    }

    #[test]
    fn mutating_request_wraps_value_in_document() {
        #[derive(Serialize)]
        struct Attrs {
            name: &'static str,
        }

        let request = client()
            .build_request(
                Method::POST,
                "organizations/acme/workspaces",
                Payload::Resource {
                    kind: "workspaces",
                    id: None,
                    value: &Attrs { name: "prod" },
                },
            )
            .unwrap();

        assert_eq!(
            request.headers()[CONTENT_TYPE.as_str()],
            DOCUMENT_CONTENT_TYPE
        );
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"data": {"type": "workspaces", "attributes": {"name": "prod"}}})
        );
    }

    #[test]
    fn update_request_addresses_resource_by_id() {
        #[derive(Serialize)]
        struct Attrs {
            description: &'static str,
        }

        let request = client()
            .build_request(
                Method::PATCH,
                "workspaces/ws-1",
                Payload::Resource {
                    kind: "workspaces",
                    id: Some("ws-1"),
                    value: &Attrs { description: "d" },
                },
            )
            .unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["data"]["id"], "ws-1");
    }

    #[test]
    fn absolute_path_is_rejected() {
        let err = client()
            .build_request::<()>(Method::GET, "/organizations", Payload::none())
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidPath(_)));
    }

    #[test]
    fn query_payload_requires_get() {
        let err = client()
            .build_request(
                Method::POST,
                "organizations",
                Payload::Query(&ListOptions::new()),
            )
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidInput(_)));
    }

    #[test]
    fn document_payload_rejects_get() {
        #[derive(Serialize)]
        struct Attrs {}

        let err = client()
            .build_request(
                Method::GET,
                "organizations",
                Payload::Resource {
                    kind: "organizations",
                    id: None,
                    value: &Attrs {},
                },
            )
            .unwrap_err();
        assert!(matches!(err, SdkError::InvalidInput(_)));
    }
}
