//! Cached resume view, keyed per user.
//!
//! Saving a resume invalidates the entry; reads fill it. Only stored resume
//! rows are cached, never generated text.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

#[async_trait]
pub trait ViewCache: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<ResumeRow>>;

    async fn put(&self, user_id: Uuid, resume: &ResumeRow) -> Result<()>;

    async fn invalidate(&self, user_id: Uuid) -> Result<()>;
}

fn view_key(user_id: Uuid) -> String {
    format!("resume:view:{user_id}")
}

pub struct RedisViewCache {
    client: redis::Client,
    ttl: Duration,
}

impl RedisViewCache {
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self { client, ttl }
    }
}

#[async_trait]
impl ViewCache for RedisViewCache {
    async fn get(&self, user_id: Uuid) -> Result<Option<ResumeRow>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(view_key(user_id)).await?;
        Ok(match raw {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        })
    }

    async fn put(&self, user_id: Uuid, resume: &ResumeRow) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(resume)?;
        conn.set_ex::<_, _, ()>(view_key(user_id), json, self.ttl.as_secs())
            .await?;
        Ok(())
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(view_key(user_id)).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_key_is_namespaced_per_user() {
        let id = Uuid::nil();
        assert_eq!(
            view_key(id),
            "resume:view:00000000-0000-0000-0000-000000000000"
        );
    }
}
