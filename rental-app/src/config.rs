//! Configuration loading from environment.

use std::env;
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::Context;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub rate_limit_per_minute: NonZeroU32,
    /// JSON catalog imported at startup, if set
    pub catalog_seed_path: Option<PathBuf>,
    /// Export spans over OTLP
    pub otel_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let rate_limit_per_minute = lookup("RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|| "100".to_string())
            .parse()
            .context("RATE_LIMIT_PER_MINUTE must be a positive integer")?;

        let catalog_seed_path = lookup("CATALOG_SEED_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let otel_enabled = match lookup("OTEL_ENABLED") {
            Some(v) => v
                .parse()
                .context("OTEL_ENABLED must be true or false")?,
            None => false,
        };

        Ok(Self {
            port,
            database_url,
            rate_limit_per_minute,
            catalog_seed_path,
            otel_enabled,
        })
    }

    /// The database URL with any `user:password@` part masked, for logging.
    pub fn redacted_database_url(&self) -> String {
        redact_credentials(&self.database_url)
    }
}

fn redact_credentials(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***@{}", scheme, &rest[at + 1..]),
        None => url.to_string(),
    }
}
