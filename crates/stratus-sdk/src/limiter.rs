// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Token-bucket rate limiter shared by all calls of one client instance.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::RateLimitConfig;
use crate::error::{Result, SdkError};

/// Token bucket with continuous replenishment.
///
/// One token is spent per wire attempt. Acquisition is fair-enough across
/// concurrent callers (sleepers re-contend on wake) without guaranteeing
/// strict FIFO order. `acquire` suspends until a token is available or the
/// caller's cancellation token fires.
#[derive(Debug)]
pub struct RateLimiter {
    /// Tokens added per second. Non-positive disables limiting.
    rate: f64,
    /// Bucket capacity.
    burst: f64,
    state: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let burst = f64::from(config.burst.max(1));
        Self {
            rate: config.requests_per_second,
            burst,
            state: Mutex::new(Bucket {
                // Starts full so short bursts never wait.
                tokens: burst,
                updated: Instant::now(),
            }),
        }
    }

    /// Take one token, waiting for replenishment if the bucket is empty.
    ///
    /// Returns [`SdkError::Cancelled`] without spending a token when the
    /// cancellation token fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        if self.rate <= 0.0 {
            return Ok(());
        }
        loop {
            if cancel.is_cancelled() {
                return Err(SdkError::Cancelled);
            }
            let wait = {
                let mut bucket = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.updated).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
                bucket.updated = now;
                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return Ok(());
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate)
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SdkError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
