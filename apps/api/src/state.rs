use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::resume::cache::ViewCache;
use crate::resume::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users and resumes. Default: `PgResumeStore`.
    pub store: Arc<dyn ResumeStore>,
    /// Cached resume views. Default: `RedisViewCache`.
    pub view_cache: Arc<dyn ViewCache>,
    pub llm: LlmClient,
    pub config: Config,
}
