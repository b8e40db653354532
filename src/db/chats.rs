//! Managed chat repository.

use super::{Database, DbError};
use crate::registry::{ChatListing, ChatRegistry, ManagedChat, RegistryError};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Repository for managed chat rows.
pub struct ChatRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChatRepository<'a> {
    /// Create a new chat repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a chat row. No uniqueness check on `chat_id`.
    pub async fn insert(&self, chat: &ManagedChat) -> Result<i64, DbError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO managed_chats (name, chat_id, invite_link, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&chat.name)
        .bind(chat.chat_id)
        .bind(&chat.invite_link)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Load every chat in insertion order.
    pub async fn load_all(&self) -> Result<Vec<ChatListing>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT name, invite_link FROM managed_chats ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, invite_link)| ChatListing { name, invite_link })
            .collect())
    }

    /// Number of rows recorded for a chat.
    #[cfg(test)]
    pub async fn count_for_chat(&self, chat_id: i64) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM managed_chats WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl ChatRegistry for Database {
    async fn insert_chat(&self, chat: ManagedChat) -> Result<(), RegistryError> {
        self.chats().insert(&chat).await?;
        Ok(())
    }

    async fn list_chats(&self) -> Result<Vec<ChatListing>, RegistryError> {
        Ok(self.chats().load_all().await?)
    }
}
