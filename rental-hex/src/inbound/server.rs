//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rental_types::Repository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{
    RateLimiterState, caller_rate_limit_middleware, client_rate_limit_middleware,
};
use crate::openapi::ApiDoc;

/// HTTP Server for the rental API.
pub struct HttpServer<R: Repository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R: Repository> HttpServer<R> {
    /// Creates a new HTTP server with the default rate limit.
    pub fn new(state: AppState<R>) -> Self {
        Self {
            state: Arc::new(state),
            rate_limiter: Arc::new(RateLimiterState::default()), // 100 req/min default
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(state: AppState<R>, requests_per_minute: NonZeroU32) -> Self {
        Self {
            state: Arc::new(state),
            rate_limiter: Arc::new(RateLimiterState::new(requests_per_minute)),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/users", post(handlers::register::<R>))
            .route("/api/users/me", get(handlers::me::<R>))
            .route(
                "/api/sessions",
                post(handlers::login::<R>).delete(handlers::logout::<R>),
            )
            .route("/api/packages", get(handlers::list_packages::<R>))
            .route("/api/cars", get(handlers::list_cars::<R>))
            .route("/api/cars/{id}", get(handlers::get_car::<R>))
            .route("/api/cars/{id}/pickup", post(handlers::pick_up::<R>))
            .route(
                "/api/card",
                post(handlers::attach_card::<R>)
                    .get(handlers::get_card::<R>)
                    .delete(handlers::remove_card::<R>),
            )
            .route("/api/card/funds", post(handlers::add_funds::<R>))
            .route("/api/orders", post(handlers::submit_order::<R>))
            .route("/api/reservation", get(handlers::get_reservation::<R>))
            .route("/api/rentals", get(handlers::list_rentals::<R>))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                caller_rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                client_rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
