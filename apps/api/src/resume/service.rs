//! Resume operations: save, fetch, and AI-assisted section rewrite.
//!
//! Every operation first resolves the caller's identity to a stored user.
//! Missing identity → `Unauthorized`; unknown identity → `NotFound`.

use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::resume::ResumeRow;
use crate::models::user::User;
use crate::resume::cache::ViewCache;
use crate::resume::prompts::build_improve_prompt;
use crate::resume::store::ResumeStore;

/// How an improve request was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImproveOutcome {
    Generated { model: String },
    /// Every model failed; the caller's text is returned unchanged.
    OriginalReturned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprovedSection {
    pub content: String,
    pub outcome: ImproveOutcome,
}

async fn resolve_user(store: &dyn ResumeStore, identity: Option<&str>) -> Result<User, AppError> {
    let external_id = identity.ok_or(AppError::Unauthorized)?;
    store
        .find_user_by_external_id(external_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Creates or overwrites the caller's resume.
pub async fn save_resume(
    store: &dyn ResumeStore,
    cache: &dyn ViewCache,
    identity: Option<&str>,
    content: &str,
) -> Result<ResumeRow, AppError> {
    let user = resolve_user(store, identity).await?;

    let resume = store
        .upsert_resume(user.id, content)
        .await
        .map_err(|e| {
            error!("Error saving resume for user {}: {e:?}", user.id);
            AppError::SaveFailed
        })?;

    info!("Saved resume {} for user {}", resume.id, user.id);

    if let Err(e) = cache.invalidate(user.id).await {
        warn!("Failed to invalidate resume view for user {}: {e}", user.id);
    }

    Ok(resume)
}

/// Returns the caller's resume, or `None` if they have never saved one.
pub async fn get_resume(
    store: &dyn ResumeStore,
    cache: &dyn ViewCache,
    identity: Option<&str>,
) -> Result<Option<ResumeRow>, AppError> {
    let user = resolve_user(store, identity).await?;

    match cache.get(user.id).await {
        Ok(Some(cached)) => return Ok(Some(cached)),
        Ok(None) => {}
        Err(e) => warn!("Resume view cache read failed for user {}: {e}", user.id),
    }

    let resume = store.find_resume(user.id).await?;

    let Some(resume) = resume else {
        return Ok(None);
    };

    if let Err(e) = cache.put(user.id, &resume).await {
        warn!("Resume view cache write failed for user {}: {e}", user.id);
        return Ok(Some(resume));
    }

    // A save may have landed between the read and the put; its invalidation
    // ran before our put, so re-check the store and drop the stale entry.
    let current = store.find_resume(user.id).await?;
    if current.as_ref() != Some(&resume) {
        if let Err(e) = cache.invalidate(user.id).await {
            warn!("Failed to drop stale resume view for user {}: {e}", user.id);
        }
        return Ok(current);
    }

    Ok(Some(resume))
}

/// Rewrites one resume section with the LLM, tailored to the user's industry.
///
/// Never fails once the user is resolved: if every model fails, the original
/// `current` text comes back with `ImproveOutcome::OriginalReturned`.
pub async fn improve_section(
    store: &dyn ResumeStore,
    llm: &LlmClient,
    identity: Option<&str>,
    current: &str,
    section_type: &str,
) -> Result<ImprovedSection, AppError> {
    let user = resolve_user(store, identity).await?;

    let prompt = build_improve_prompt(current, section_type, user.industry.as_deref());

    match llm.generate(&prompt).await {
        Ok(generation) => Ok(ImprovedSection {
            content: generation.text,
            outcome: ImproveOutcome::Generated {
                model: generation.model,
            },
        }),
        Err(e) => {
            error!("{e}. Returning original content for user {}", user.id);
            Ok(ImprovedSection {
                content: current.to_string(),
                outcome: ImproveOutcome::OriginalReturned,
            })
        }
    }
}
