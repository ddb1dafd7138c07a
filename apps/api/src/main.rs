mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::gemini::GeminiBackend;
use crate::llm_client::LlmClient;
use crate::resume::cache::RedisViewCache;
use crate::resume::store::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgResumeStore::new(db));

    // Initialize Redis (resume view cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let view_cache = Arc::new(RedisViewCache::new(redis, config.view_cache_ttl));
    info!("Redis client initialized");

    // Initialize LLM client: one backend, constructed once, shared by all requests
    let backend = Arc::new(GeminiBackend::new(
        &config.gemini_api_url,
        config.gemini_api_key.clone(),
        config.gemini_timeout,
    )?);
    let llm = LlmClient::new(
        backend,
        config.gemini_models.clone(),
        config.rate_limit_backoff,
    )?;
    info!(
        "LLM client initialized (models: {}, rate-limit backoff: {}ms)",
        llm.models().join(", "),
        config.rate_limit_backoff.as_millis()
    );

    // Build app state
    let state = AppState {
        store,
        view_cache,
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
