//! # Rental Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Import the catalog seed, if configured
//! - Start the HTTP server

mod config;
mod seed;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rental_hex::inbound::{AppState, HttpServer};
use rental_repo::build_repo;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("rental-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;

    let (telemetry, otel_provider) = if config.otel_enabled {
        let (tracer, provider) = init_tracer()?;
        (
            Some(tracing_opentelemetry::layer().with_tracer(tracer)),
            Some(provider),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rental_app=debug,rental_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting rental server on port {}", config.port);
    tracing::info!("Using database: {}", config.redacted_database_url());

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let state = AppState::new(Arc::new(repo));

    if let Some(path) = &config.catalog_seed_path {
        let seed = seed::load_seed(path).await?;
        let summary = state.catalog.import(seed).await?;
        tracing::info!(
            packages = summary.packages_created,
            cars = summary.cars_created,
            skipped = summary.skipped,
            "Catalog seed applied from {}",
            path.display()
        );
    }

    let server = HttpServer::with_rate_limit(state, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    Ok(())
}
