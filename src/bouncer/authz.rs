//! Authorization check shared by both flows.

use super::Bouncer;
use crate::error::{BouncerError, BouncerResult};

impl Bouncer {
    /// True iff the directory knows the user and holds at least one officer
    /// credential for them. An unknown user is simply not authorized.
    ///
    /// Reads only; calling it twice without a directory change gives the
    /// same answer.
    pub async fn is_authorized(&self, user_id: i64) -> BouncerResult<bool> {
        let record = self
            .directory
            .get(user_id)
            .await
            .map_err(|source| BouncerError::Directory { user_id, source })?;

        Ok(record.is_some_and(|r| r.is_officer()))
    }
}
