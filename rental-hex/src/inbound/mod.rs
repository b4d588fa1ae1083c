//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application services.

mod auth;
mod handlers;
mod rate_limit;
mod server;

pub use auth::BearerToken;
pub use handlers::{ApiError, AppState};
pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState};
pub use server::HttpServer;
