//! Moderated join requests.
//!
//! ```text
//! PENDING --grace period--> check --+--> approve --ok--> APPROVED
//!                                    +--> decline --ok--> DECLINED
//!            approve/decline -- already resolved --> OVERRIDDEN
//! ```
//!
//! The announcement goes out first, then the task sleeps for the grace
//! period so a moderator can act through the chat's own UI. Only after the
//! sleep is the directory consulted, so a credential recorded during the
//! window still counts.

use super::{Bouncer, UserIdentity, announce};
use crate::error::{Action, BouncerResult, TransportResultExt};
use crate::transport::ParseMode;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// An in-flight join request. Never persisted.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub chat_id: i64,
    pub requester: UserIdentity,
    /// Private chat usable to reach the requester before they are a member.
    pub private_chat_id: i64,
    pub submitted_at: DateTime<Utc>,
}

impl JoinRequest {
    pub fn new(chat_id: i64, requester: UserIdentity, private_chat_id: i64) -> Self {
        Self {
            chat_id,
            requester,
            private_chat_id,
            submitted_at: Utc::now(),
        }
    }

    /// Key of the pending-task table.
    #[inline]
    pub fn key(&self) -> (i64, i64) {
        (self.chat_id, self.requester.id)
    }
}

/// Terminal state of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Approved,
    Declined,
    /// A moderator resolved the request before the bot did.
    Overridden,
}

impl JoinOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Overridden => "overridden",
        }
    }
}

impl Bouncer {
    /// Run one join request to its terminal state.
    ///
    /// Any transport or directory error other than the override race aborts
    /// the request; messages already sent stay sent.
    pub async fn handle_join_request(&self, request: &JoinRequest) -> BouncerResult<JoinOutcome> {
        let chat_id = request.chat_id;
        let user = &request.requester;

        self.transport
            .send_message(
                chat_id,
                &announce::join_pending(user, self.config.grace_period()),
                Some(ParseMode::Markdown),
            )
            .await
            .during(Action::AnnouncePending, chat_id, user.id)?;

        tokio::time::sleep(self.config.grace_period()).await;

        let authorized = self.is_authorized(user.id).await?;

        let decision = if authorized {
            self.transport.approve_join_request(chat_id, user.id).await
        } else {
            self.transport.decline_join_request(chat_id, user.id).await
        };

        match decision {
            Ok(()) => {}
            Err(e) if e.is_already_resolved() => {
                info!(
                    chat_id,
                    user_id = user.id,
                    authorized,
                    "Join request already resolved by a moderator"
                );
                self.transport
                    .send_message(
                        chat_id,
                        &announce::join_overridden(user),
                        Some(ParseMode::Markdown),
                    )
                    .await
                    .during(Action::AnnounceOverride, chat_id, user.id)?;
                return Ok(JoinOutcome::Overridden);
            }
            Err(e) => {
                let action = if authorized {
                    Action::Approve
                } else {
                    Action::Decline
                };
                return Err(e).during(action, chat_id, user.id);
            }
        }

        let waited_ms = (Utc::now() - request.submitted_at).num_milliseconds();

        if authorized {
            info!(
                chat_id,
                user_id = user.id,
                name = %user.display_name,
                waited_ms,
                "Allowing verified officer to join chat"
            );
            self.transport
                .send_message(
                    chat_id,
                    &announce::join_approved(user),
                    Some(ParseMode::Markdown),
                )
                .await
                .during(Action::AnnounceApproved, chat_id, user.id)?;
            return Ok(JoinOutcome::Approved);
        }

        warn!(
            chat_id,
            user_id = user.id,
            name = %user.display_name,
            waited_ms,
            "Unauthorized join request: rejecting"
        );
        self.transport
            .send_message(
                chat_id,
                &announce::join_declined(user),
                Some(ParseMode::Markdown),
            )
            .await
            .during(Action::AnnounceDeclined, chat_id, user.id)?;
        self.transport
            .send_message(request.private_chat_id, announce::VERIFY_PROMPT, None)
            .await
            .during(Action::PromptRequester, chat_id, user.id)?;

        Ok(JoinOutcome::Declined)
    }
}
