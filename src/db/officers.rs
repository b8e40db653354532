//! Officer directory queries.
//!
//! Rows are written by the verification service; this side only reads.

use super::{Database, DbError};
use crate::directory::{DirectoryError, OfficerRecord, UserDirectory, UserRecord};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Repository for officer directory lookups.
pub struct OfficerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OfficerRepository<'a> {
    /// Create a new officer repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user and all of their verified credentials.
    pub async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, DbError> {
        let known: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM directory_users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        if known.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT agency, department, title
            FROM officer_records
            WHERE user_id = ?
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let officer_records = rows
            .into_iter()
            .map(|(agency, department, title)| OfficerRecord {
                agency,
                department,
                title,
            })
            .collect();

        Ok(Some(UserRecord {
            user_id,
            officer_records,
        }))
    }
}

#[async_trait]
impl UserDirectory for Database {
    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.officers().find_user(user_id).await?)
    }
}
