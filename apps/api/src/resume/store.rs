//! Persistence for users and their single resume document.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::ResumeRow;
use crate::models::user::User;

/// Storage boundary used by the resume service.
///
/// Carried in `AppState` as `Arc<dyn ResumeStore>`.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;

    async fn find_resume(&self, user_id: Uuid) -> Result<Option<ResumeRow>>;

    /// Inserts the user's resume, or overwrites its content if one exists.
    async fn upsert_resume(&self, user_id: Uuid, content: &str) -> Result<ResumeRow>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_resume(&self, user_id: Uuid) -> Result<Option<ResumeRow>> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_resume(&self, user_id: Uuid, content: &str) -> Result<ResumeRow> {
        // UNIQUE(user_id) makes this the single-row-per-user guarantee.
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, user_id, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?)
    }
}
