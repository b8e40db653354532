//! Managed chat registry abstraction.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry backend error: {0}")]
    Backend(String),
}

impl From<crate::db::DbError> for RegistryError {
    fn from(err: crate::db::DbError) -> Self {
        RegistryError::Backend(err.to_string())
    }
}

/// A chat the bot has been added to, with its moderated invite link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedChat {
    pub name: String,
    pub chat_id: i64,
    pub invite_link: String,
}

/// What `/invites` shows to an officer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatListing {
    pub name: String,
    pub invite_link: String,
}

#[async_trait]
pub trait ChatRegistry: Send + Sync {
    /// Record a chat. Re-adding the same chat inserts another row.
    async fn insert_chat(&self, chat: ManagedChat) -> Result<(), RegistryError>;

    /// All known chats, oldest first.
    async fn list_chats(&self) -> Result<Vec<ChatListing>, RegistryError>;
}
