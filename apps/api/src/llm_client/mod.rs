/// LLM Client: the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generation goes through `LlmClient::generate`, which walks the
/// configured model list in priority order and returns the first success.
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

pub mod gemini;
pub mod prompts;

/// How a single backend attempt failed. Decides what the fallback loop does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Model variant unknown or retired (404 / NOT_FOUND). Skip immediately.
    NotFound,
    /// Throttled (429 / RESOURCE_EXHAUSTED). Wait the fixed backoff, then skip.
    RateLimited,
    /// Key not authorized for this model (403 / PERMISSION_DENIED). Skip.
    PermissionDenied,
    /// Anything else: 5xx, transport failure, unusable body. Skip.
    Other,
}

/// Error returned by one `GenerationBackend` call.
#[derive(Debug, Clone, Error)]
#[error("{kind:?} (status {status:?}): {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Classifies an HTTP failure from its status code and the provider's
    /// structured status string (e.g. `"PERMISSION_DENIED"`), if any.
    pub fn from_status(status: u16, api_status: Option<&str>, message: impl Into<String>) -> Self {
        let kind = match (status, api_status) {
            (404, _) | (_, Some("NOT_FOUND")) => BackendErrorKind::NotFound,
            (429, _) | (_, Some("RESOURCE_EXHAUSTED")) => BackendErrorKind::RateLimited,
            (403, _) | (_, Some("PERMISSION_DENIED")) => BackendErrorKind::PermissionDenied,
            _ => BackendErrorKind::Other,
        };
        Self::new(kind, Some(status), message)
    }
}

/// One model variant of a generative-text service.
///
/// Carried by `LlmClient` as `Arc<dyn GenerationBackend>` so tests can swap it.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(&self, model: &str, prompt: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("All models failed after {attempts} attempts")]
    Exhausted { attempts: usize },
}

/// Successful generation, tagged with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

/// The single LLM client used by all services.
/// Wraps a generation backend with sequential model fallback.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn GenerationBackend>,
    models: Vec<String>,
    rate_limit_backoff: Duration,
}

impl LlmClient {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        models: Vec<String>,
        rate_limit_backoff: Duration,
    ) -> Result<Self> {
        if models.is_empty() {
            bail!("LlmClient requires at least one model");
        }
        Ok(Self {
            backend,
            models,
            rate_limit_backoff,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Tries each configured model in order and returns the first success, trimmed.
    ///
    /// Per-model failures never escape this loop: not-found, permission-denied and
    /// unclassified errors advance immediately; rate limits sleep for the fixed
    /// backoff first. The only terminal error is running out of models.
    pub async fn generate(&self, prompt: &str) -> Result<Generation, LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        for model in &self.models {
            let err = match self.backend.generate_content(model, prompt).await {
                Ok(text) => {
                    info!(model = %model, "Generation succeeded");
                    return Ok(Generation {
                        text: text.trim().to_string(),
                        model: model.clone(),
                    });
                }
                Err(err) => err,
            };

            match err.kind {
                BackendErrorKind::NotFound => {
                    warn!(model = %model, "Model not available, trying next");
                }
                BackendErrorKind::RateLimited => {
                    warn!(
                        model = %model,
                        backoff_ms = self.rate_limit_backoff.as_millis() as u64,
                        "Rate limited, waiting before trying next model"
                    );
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                BackendErrorKind::PermissionDenied => {
                    error!(model = %model, "API key not authorized for this model");
                }
                BackendErrorKind::Other => {
                    error!(model = %model, error = %err, "Generation failed");
                }
            }
        }

        error!(attempts = self.models.len(), "All models failed");
        Err(LlmError::Exhausted {
            attempts: self.models.len(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{client, ScriptedBackend};
    use super::*;
    use tokio::time::Instant;

    const BACKOFF: Duration = Duration::from_millis(2000);

    #[tokio::test(start_paused = true)]
    async fn test_first_success_wins_and_is_trimmed() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .ok("a", "  rewritten text \n")
                .ok("b", "never used"),
        );
        let llm = client(backend.clone(), &["a", "b"], BACKOFF);

        let started = Instant::now();
        let generation = llm.generate("prompt").await.unwrap();

        assert_eq!(generation.text, "rewritten text");
        assert_eq!(generation.model, "a");
        assert_eq!(backend.calls(), vec!["a"]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_skips_to_next_without_delay() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("a", BackendErrorKind::NotFound, Some(404))
                .ok("b", "from b")
                .ok("c", "from c"),
        );
        let llm = client(backend.clone(), &["a", "b", "c"], BACKOFF);

        let started = Instant::now();
        let generation = llm.generate("prompt").await.unwrap();

        assert_eq!(generation.text, "from b");
        assert_eq!(backend.calls(), vec!["a", "b"]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_and_permission_denied_exhaust_without_delay() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("a", BackendErrorKind::NotFound, Some(404))
                .fail("b", BackendErrorKind::PermissionDenied, Some(403))
                .fail("c", BackendErrorKind::NotFound, Some(404)),
        );
        let llm = client(backend.clone(), &["a", "b", "c"], BACKOFF);

        let started = Instant::now();
        let err = llm.generate("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Exhausted { attempts: 3 }));
        assert_eq!(backend.calls(), vec!["a", "b", "c"]);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_fixed_backoff_per_hit() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("a", BackendErrorKind::RateLimited, Some(429))
                .fail("b", BackendErrorKind::RateLimited, Some(429))
                .ok("c", "from c"),
        );
        let llm = client(backend.clone(), &["a", "b", "c"], BACKOFF);

        let started = Instant::now();
        let generation = llm.generate("prompt").await.unwrap();

        assert_eq!(generation.text, "from c");
        assert_eq!(backend.calls(), vec!["a", "b", "c"]);
        assert_eq!(started.elapsed(), BACKOFF * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_model_is_not_retried() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("a", BackendErrorKind::RateLimited, Some(429))
                .ok("a", "second try on a"),
        );
        let llm = client(backend.clone(), &["a"], Duration::from_millis(500));

        let started = Instant::now();
        let err = llm.generate("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Exhausted { attempts: 1 }));
        assert_eq!(backend.calls(), vec!["a"]);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unclassified_errors_advance_then_exhaust() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .fail("a", BackendErrorKind::Other, Some(500))
                .fail("b", BackendErrorKind::Other, None)
                .fail("c", BackendErrorKind::Other, Some(503)),
        );
        let llm = client(backend.clone(), &["a", "b", "c"], BACKOFF);

        let err = llm.generate("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Exhausted { attempts: 3 }));
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_calls() {
        let backend = Arc::new(ScriptedBackend::new().ok("a", "text"));
        let llm = client(backend.clone(), &["a"], BACKOFF);

        let err = llm.generate("   ").await.unwrap_err();

        assert!(matches!(err, LlmError::EmptyPrompt));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_client_requires_models() {
        let backend = Arc::new(ScriptedBackend::new());
        assert!(LlmClient::new(backend, vec![], BACKOFF).is_err());
    }

    #[test]
    fn test_status_classification() {
        let kind = |s: u16, api: Option<&'static str>| BackendError::from_status(s, api, "").kind;
        assert_eq!(kind(404, None), BackendErrorKind::NotFound);
        assert_eq!(kind(429, None), BackendErrorKind::RateLimited);
        assert_eq!(kind(403, None), BackendErrorKind::PermissionDenied);
        assert_eq!(kind(400, Some("PERMISSION_DENIED")), BackendErrorKind::PermissionDenied);
        assert_eq!(kind(400, Some("RESOURCE_EXHAUSTED")), BackendErrorKind::RateLimited);
        assert_eq!(kind(500, Some("INTERNAL")), BackendErrorKind::Other);
        assert_eq!(kind(400, None), BackendErrorKind::Other);
    }
}
