use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account record owned by the identity subsystem. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider user id.
    pub external_id: String,
    pub email: String,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
}
