use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
/// Priority order: the fast tier first, heavier tiers after.
const DEFAULT_GEMINI_MODELS: &str = "gemini-2.0-flash,gemini-1.5-flash,gemini-1.5-pro";
const DEFAULT_RATE_LIMIT_BACKOFF_MS: u64 = 2000;
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;
const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";
const DEFAULT_VIEW_CACHE_TTL_SECS: u64 = 300;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_models: Vec<String>,
    pub rate_limit_backoff: Duration,
    pub gemini_timeout: Duration,
    /// Header carrying the external user id, set by the identity gateway.
    pub identity_header: String,
    pub view_cache_ttl: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_models: parse_model_list(
                &std::env::var("GEMINI_MODELS")
                    .unwrap_or_else(|_| DEFAULT_GEMINI_MODELS.to_string()),
            )?,
            rate_limit_backoff: Duration::from_millis(parse_env_or(
                "GEMINI_RATE_LIMIT_BACKOFF_MS",
                DEFAULT_RATE_LIMIT_BACKOFF_MS,
            )?),
            gemini_timeout: Duration::from_secs(parse_env_or(
                "GEMINI_TIMEOUT_SECS",
                DEFAULT_GEMINI_TIMEOUT_SECS,
            )?),
            identity_header: std::env::var("IDENTITY_HEADER")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_HEADER.to_string()),
            view_cache_ttl: Duration::from_secs(require_nonzero(
                "RESUME_VIEW_CACHE_TTL_SECS",
                parse_env_or("RESUME_VIEW_CACHE_TTL_SECS", DEFAULT_VIEW_CACHE_TTL_SECS)?,
            )?),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Redis `SETEX` rejects a zero expiry.
fn require_nonzero(key: &str, value: u64) -> Result<u64> {
    if value == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}

/// Splits a comma-separated model list, dropping blanks. Order is preserved.
pub fn parse_model_list(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        bail!("GEMINI_MODELS must name at least one model");
    }
    Ok(models)
}
