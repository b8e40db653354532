//! User directory abstraction.
//!
//! The directory is populated by the external verification process and is
//! read-only from the bouncer's point of view.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(String),
}

impl From<crate::db::DbError> for DirectoryError {
    fn from(err: crate::db::DbError) -> Self {
        DirectoryError::Backend(err.to_string())
    }
}

/// A verified public-officer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerRecord {
    pub agency: String,
    pub department: String,
    pub title: String,
}

/// A user known to the directory.
#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    pub user_id: i64,
    /// Verified credentials. Empty means the user has not been verified.
    pub officer_records: Vec<OfficerRecord>,
}

impl UserRecord {
    /// True when at least one credential is on file.
    #[inline]
    pub fn is_officer(&self) -> bool {
        !self.officer_records.is_empty()
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user. `Ok(None)` means the user is unknown, which is not an error.
    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError>;
}
