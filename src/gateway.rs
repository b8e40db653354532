//! Bot API update poller.
//!
//! One long-poll loop pulls updates and turns each into an [`Inbound`]
//! event. Every event runs on its own task so a join request sitting in its
//! grace period never holds up polling.

use crate::bouncer::{
    Bouncer, INVITES_UNVERIFIED, JoinRequest, NewMembersEvent, UserIdentity, invite_listing,
};
use crate::transport::types::Update;
use crate::transport::{TelegramClient, Transport, TransportError, TransportErrorKind};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(3);

/// Events the bouncer acts on.
#[derive(Debug, Clone)]
pub enum Inbound {
    JoinRequest(JoinRequest),
    NewMembers(NewMembersEvent),
    /// `/invites` sent to the bot in a private chat.
    ListGroups { chat_id: i64, user_id: i64 },
}

/// Map an update to an inbound event. Anything else is ignored.
///
/// Member additions are only acted on in chats with a title, i.e. groups.
pub fn route(update: Update, bot_id: i64) -> Option<Inbound> {
    if let Some(request) = update.chat_join_request {
        let submitted_at = DateTime::from_timestamp(request.date, 0).unwrap_or_else(Utc::now);
        return Some(Inbound::JoinRequest(JoinRequest {
            chat_id: request.chat.id,
            requester: UserIdentity::new(request.from.id, request.from.first_name),
            private_chat_id: request.user_chat_id,
            submitted_at,
        }));
    }

    let message = update.message?;

    if let Some(members) = message.new_chat_members {
        let chat_title = message.chat.title.filter(|t| !t.is_empty())?;
        if members.is_empty() {
            return None;
        }
        return Some(Inbound::NewMembers(NewMembersEvent {
            chat_id: message.chat.id,
            chat_title,
            bot_id,
            members: members
                .into_iter()
                .map(|u| UserIdentity::new(u.id, u.first_name))
                .collect(),
        }));
    }

    if message.chat.is_private()
        && let Some(text) = message.text.as_deref()
        && is_command(text, "invites")
    {
        let from = message.from?;
        return Some(Inbound::ListGroups {
            chat_id: message.chat.id,
            user_id: from.id,
        });
    }

    None
}

/// `/name`, `/name@botname`, optionally followed by arguments.
fn is_command(text: &str, name: &str) -> bool {
    let Some(word) = text.split_whitespace().next() else {
        return false;
    };
    let Some(command) = word.strip_prefix('/') else {
        return false;
    };
    command.split('@').next() == Some(name)
}

/// Long-polling front end.
pub struct Gateway {
    client: Arc<TelegramClient>,
    bouncer: Arc<Bouncer>,
    bot_id: i64,
    poll_timeout_secs: u64,
}

impl Gateway {
    /// Resolve the bot's identity and prepare to poll.
    pub async fn connect(
        client: Arc<TelegramClient>,
        bouncer: Arc<Bouncer>,
        poll_timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let me = client.get_me().await?;
        info!(bot_id = me.id, name = %me.first_name, "Connected to Bot API");

        Ok(Self {
            client,
            bouncer,
            bot_id: me.id,
            poll_timeout_secs,
        })
    }

    /// Poll until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: i64 = 0;

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => {
                    info!(pending = self.bouncer.pending_count(), "Gateway shutting down");
                    return;
                }
                polled = self.client.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    crate::metrics::record_poll_error();
                    let pause = match &e.kind {
                        TransportErrorKind::RateLimited { retry_after } => {
                            Duration::from_secs(*retry_after)
                        }
                        _ => POLL_BACKOFF,
                    };
                    warn!(error = %e, pause_secs = pause.as_secs(), "getUpdates failed");
                    tokio::time::sleep(pause).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                crate::metrics::record_update();
                match route(update, self.bot_id) {
                    Some(inbound) => self.dispatch(inbound),
                    None => debug!("Ignoring update"),
                }
            }
        }
    }

    fn dispatch(&self, inbound: Inbound) {
        match inbound {
            Inbound::JoinRequest(request) => {
                info!(
                    chat_id = request.chat_id,
                    user_id = request.requester.id,
                    "Join request received"
                );
                // Flow errors are logged by the bouncer.
                drop(self.bouncer.on_join_request(request));
            }
            Inbound::NewMembers(event) => {
                let bouncer = Arc::clone(&self.bouncer);
                tokio::spawn(async move {
                    let _ = bouncer.on_new_members_added(event).await;
                });
            }
            Inbound::ListGroups { chat_id, user_id } => {
                let bouncer = Arc::clone(&self.bouncer);
                let client = Arc::clone(&self.client);
                tokio::spawn(async move {
                    if let Err(e) = reply_invites(&bouncer, client.as_ref(), chat_id, user_id).await {
                        error!(chat_id, user_id, error = %e, "Error retrieving chat invite links");
                    }
                });
            }
        }
    }
}

async fn reply_invites(
    bouncer: &Bouncer,
    transport: &dyn Transport,
    chat_id: i64,
    user_id: i64,
) -> anyhow::Result<()> {
    let text = if bouncer.is_authorized(user_id).await? {
        invite_listing(&bouncer.on_list_groups_requested().await?)
    } else {
        INVITES_UNVERIFIED.to_string()
    };
    transport.send_message(chat_id, &text, None).await?;
    Ok(())
}
