// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-call context: cancellation and response observation.

use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;

/// Callback invoked once per received HTTP response, before any error
/// classification. Retried attempts each produce one invocation.
pub type ResponseObserver = dyn Fn(u16, &HeaderMap) + Send + Sync;

/// Context threaded through a single SDK call.
///
/// Carries the caller's cancellation token, honored at every suspension
/// point (rate-limiter wait, network send, backoff sleep, body read), and an
/// optional response observer for diagnostics.
///
/// The default context never cancels and observes nothing:
///
/// ```ignore
/// let ctx = CallContext::default();
/// let workspaces = client.workspaces().list(&ctx, "acme", ListOptions::default()).await?;
/// ```
#[derive(Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    observer: Option<Arc<ResponseObserver>>,
}

impl CallContext {
    /// Create a context with a fresh, never-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token. Cancelling it aborts the call at the
    /// next suspension point with [`SdkError::Cancelled`](crate::SdkError::Cancelled).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Attach a response observer.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(u16, &HeaderMap) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// The cancellation token for this call.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the caller has already cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Invoke the observer for one received response, if one is attached.
    pub(crate) fn observe_response(&self, status: u16, headers: &HeaderMap) {
        if let Some(observer) = &self.observer {
            observer(status, headers);
        }
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn default_context_is_not_cancelled() {
        let ctx = CallContext::new();
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn cancellation_is_visible_through_context() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn observer_fires_per_response() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let ctx = CallContext::new().with_observer(move |status, _headers| {
            assert_eq!(status, 503);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let headers = HeaderMap::new();
        ctx.observe_response(503, &headers);
        ctx.observe_response(503, &headers);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_observer_is_a_noop() {
        let ctx = CallContext::new();
        ctx.observe_response(200, &HeaderMap::new());
    }
}
