use anyhow::{Context, Result};

use crate::ingest::providers::{GREENHOUSE_BASE_URL, REMOTEOK_URL, REMOTIVE_URL};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Shared secret for the ingestion trigger and admin mutations.
    pub internal_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub scheduler_enabled: bool,
    pub http_timeout_secs: u64,
    pub remoteok_url: String,
    pub remotive_url: String,
    pub greenhouse_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            internal_api_key: require_env("INTERNAL_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scheduler_enabled: parse_flag(
                std::env::var("INGEST_SCHEDULER_ENABLED").ok().as_deref(),
                true,
            ),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            remoteok_url: env_or("REMOTEOK_URL", REMOTEOK_URL),
            remotive_url: env_or("REMOTIVE_URL", REMOTIVE_URL),
            greenhouse_base_url: env_or("GREENHOUSE_BASE_URL", GREENHOUSE_BASE_URL),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/jobboard_test".to_string(),
            internal_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            scheduler_enabled: false,
            http_timeout_secs: 5,
            remoteok_url: REMOTEOK_URL.to_string(),
            remotive_url: REMOTIVE_URL.to_string(),
            greenhouse_base_url: GREENHOUSE_BASE_URL.to_string(),
        }
    }
}
