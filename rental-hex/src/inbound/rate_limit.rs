//! Rate limiting middleware using Governor.
//!
//! Token buckets per client address (ahead of authentication) and per
//! authenticated caller.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc};

use rental_types::Caller;

pub const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(100).unwrap();

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-caller rate limiters
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    /// Quota for new callers
    quota: Quota,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateLimiterState {
    /// Allows `requests_per_minute` requests per caller, all of them as a
    /// burst.
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        Self {
            limiters: DashMap::new(),
            quota: Quota::per_minute(requests_per_minute),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)));

        limiter.check().is_ok()
    }
}

/// Per-client bucket, keyed on the peer address.
///
/// Present only when the router is served with connect info, as
/// `HttpServer::run` does.
fn client_key(request: &Request<Body>) -> Option<String> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("client:{}", addr.ip()))
}

/// Per-caller bucket, present once the auth middleware resolved a session.
fn caller_key(request: &Request<Body>) -> Option<String> {
    request
        .extensions()
        .get::<Caller>()
        .map(|caller| format!("user:{}", caller.user_id))
}

fn rate_limited(key: &str) -> Response {
    tracing::warn!(key = %key, "Rate limit exceeded");
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Rate limit exceeded. Please try again later.",
            "code": 429,
            "kind": "rate_limited",
            "retry_after_seconds": 60
        })),
    )
        .into_response()
}

async fn limit_by(
    limiter: &RateLimiterState,
    key: Option<String>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    if let Some(key) = key {
        if !limiter.check(&key) {
            return rate_limited(&key);
        }
    }

    next.run(request).await
}

/// Limits each client address. Runs before authentication, so it also bounds
/// requests carrying bad tokens and every public route.
pub async fn client_rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);
    limit_by(&limiter, key, request, next).await
}

/// Limits each authenticated caller across all of their addresses.
/// Expects the auth middleware to have run first.
pub async fn caller_rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = caller_key(&request);
    limit_by(&limiter, key, request, next).await
}
