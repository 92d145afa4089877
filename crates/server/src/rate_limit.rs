// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-client sliding-window rate limiting.
//!
//! Clients are identified by peer address, then `x-forwarded-for`, then a
//! shared `unknown` bucket. Each client may make `limit` requests in any
//! rolling `window`.

use axum::{
    Json,
    extract::{ConnectInfo, Request, State as AxumState},
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

type Buckets = HashMap<String, VecDeque<Instant>>;

/// Rate limit rejections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The client used up its budget for the current window.
    #[error("Too many requests: at most {limit} per {window_secs} seconds")]
    TooManyRequests {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let Self::TooManyRequests {
            retry_after_secs, ..
        } = self;
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.to_string(),
            retryable: true,
        });
        let mut response: Response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        response
    }
}

/// Sliding-window request budget per client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    buckets: Arc<Mutex<Buckets>>,
}

impl RateLimiter {
    /// Allows `limit` requests per client in any `window`.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn buckets(&self) -> MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a request from `client` at `now`.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitError::TooManyRequests` if the client already made
    /// `limit` requests within the window. Rejected requests are not counted.
    pub fn check(&self, client: &str, now: Instant) -> Result<(), RateLimitError> {
        let mut buckets: MutexGuard<'_, Buckets> = self.buckets();
        let bucket: &mut VecDeque<Instant> = buckets.entry(client.to_string()).or_default();

        while bucket
            .front()
            .is_some_and(|oldest| now.saturating_duration_since(*oldest) >= self.window)
        {
            bucket.pop_front();
        }

        if bucket.len() >= usize::try_from(self.limit).unwrap_or(usize::MAX) {
            let retry_after: Duration = bucket.front().map_or(self.window, |oldest| {
                self.window
                    .saturating_sub(now.saturating_duration_since(*oldest))
            });
            return Err(RateLimitError::TooManyRequests {
                limit: self.limit,
                window_secs: self.window.as_secs(),
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        bucket.push_back(now);
        Ok(())
    }

    /// Drops clients with no requests inside the window.
    ///
    /// Returns how many were dropped.
    pub fn prune(&self, now: Instant) -> usize {
        let mut buckets: MutexGuard<'_, Buckets> = self.buckets();
        let before: usize = buckets.len();
        buckets.retain(|_, bucket| {
            bucket
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < self.window)
        });
        before - buckets.len()
    }

    /// Number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.buckets().len()
    }
}

/// Identifies the client a request is charged to.
#[must_use]
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(addr) = peer {
        return addr.ip().to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| String::from("unknown"), ToString::to_string)
}

/// Middleware enforcing the limiter in [`AppState`].
pub async fn rate_limit(
    AxumState(state): AxumState<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let peer: Option<SocketAddr> = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client: String = client_identity(request.headers(), peer);

    if let Err(err) = state.limiter.check(&client, Instant::now()) {
        warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
        return err.into_response();
    }

    debug!(client = %client, "Request admitted");
    next.run(request).await
}
