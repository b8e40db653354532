//! Members added without a join request.
//!
//! Covers two cases in the same event: the bot itself being added to a chat
//! (provision a moderated invite link and register the chat) and humans
//! added directly (kick anyone who is not a verified officer).

use super::{Bouncer, UserIdentity, announce};
use crate::error::{Action, BouncerError, BouncerResult, TransportResultExt};
use crate::registry::ManagedChat;
use crate::transport::ParseMode;
use chrono::Utc;
use tracing::{debug, info, warn};

/// A batch of members that appeared in a chat.
#[derive(Debug, Clone)]
pub struct NewMembersEvent {
    pub chat_id: i64,
    pub chat_title: String,
    /// The bot's own user id, to recognise its own addition.
    pub bot_id: i64,
    pub members: Vec<UserIdentity>,
}

/// What happened to one added member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOutcome {
    /// The bot was added; the chat is now registered.
    Provisioned { invite_link: String },
    /// Unauthorized human, temporarily banned.
    Removed { user_id: i64 },
    /// Verified officer, left alone.
    Admitted { user_id: i64 },
}

impl MemberOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioned { .. } => "provisioned",
            Self::Removed { .. } => "removed",
            Self::Admitted { .. } => "admitted",
        }
    }
}

impl Bouncer {
    /// Process every added member in order. The first collaborator error
    /// stops the batch.
    pub async fn handle_direct_invite(
        &self,
        event: &NewMembersEvent,
    ) -> BouncerResult<Vec<MemberOutcome>> {
        let mut outcomes = Vec::with_capacity(event.members.len());

        for member in &event.members {
            let outcome = if member.id == event.bot_id {
                self.provision_chat(event).await?
            } else {
                self.screen_direct_member(event.chat_id, member).await?
            };
            crate::metrics::record_direct_join(outcome.as_str());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    async fn provision_chat(&self, event: &NewMembersEvent) -> BouncerResult<MemberOutcome> {
        let invite_link = self
            .transport
            .create_invite_link(event.chat_id, true)
            .await
            .during(Action::CreateInviteLink, event.chat_id, event.bot_id)?;

        self.registry
            .insert_chat(ManagedChat {
                name: event.chat_title.clone(),
                chat_id: event.chat_id,
                invite_link: invite_link.clone(),
            })
            .await
            .map_err(|source| BouncerError::Registry {
                chat_id: event.chat_id,
                source,
            })?;

        info!(
            chat_id = event.chat_id,
            title = %event.chat_title,
            "Bot added to chat, moderated invite link registered"
        );
        Ok(MemberOutcome::Provisioned { invite_link })
    }

    async fn screen_direct_member(
        &self,
        chat_id: i64,
        member: &UserIdentity,
    ) -> BouncerResult<MemberOutcome> {
        if self.is_authorized(member.id).await? {
            debug!(chat_id, user_id = member.id, "Verified officer added directly");
            return Ok(MemberOutcome::Admitted { user_id: member.id });
        }

        let until = Utc::now() + self.config.direct_join_ban();
        self.transport
            .ban_member(chat_id, member.id, until)
            .await
            .during(Action::Ban, chat_id, member.id)?;

        warn!(
            chat_id,
            user_id = member.id,
            name = %member.display_name,
            until = %until,
            "Unauthorized user joined via direct link: removing from group"
        );

        self.transport
            .send_message(
                chat_id,
                &announce::direct_join_removed(member),
                Some(ParseMode::Markdown),
            )
            .await
            .during(Action::AnnounceRemoval, chat_id, member.id)?;

        Ok(MemberOutcome::Removed { user_id: member.id })
    }
}
