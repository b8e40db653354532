//! Membership gatekeeper.
//!
//! [`Bouncer`] owns no platform state of its own: it reads the directory,
//! writes the registry and acts through the transport, all injected at
//! construction. The only thing it tracks is the table of join requests
//! still inside their grace period, one task per `(chat_id, user_id)`.

mod announce;
mod authz;
mod direct_invite;
mod join_request;

pub use announce::{INVITES_UNVERIFIED, VERIFY_PROMPT, invite_listing};
pub use direct_invite::{MemberOutcome, NewMembersEvent};
pub use join_request::{JoinOutcome, JoinRequest};

use crate::config::BouncerConfig;
use crate::directory::UserDirectory;
use crate::error::BouncerResult;
use crate::registry::{ChatListing, ChatRegistry, RegistryError};
use crate::transport::Transport;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{Instrument, debug, error, info};

/// A user as seen in an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i64,
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(id: i64, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

struct PendingJoin {
    /// Distinguishes a replacement task from the one it replaced.
    ticket: u64,
    abort: AbortHandle,
}

/// Access-control decision engine for managed chats.
pub struct Bouncer {
    transport: Arc<dyn Transport>,
    directory: Arc<dyn UserDirectory>,
    registry: Arc<dyn ChatRegistry>,
    config: BouncerConfig,
    pending: DashMap<(i64, i64), PendingJoin>,
    next_ticket: AtomicU64,
}

impl Bouncer {
    pub fn new(
        transport: Arc<dyn Transport>,
        directory: Arc<dyn UserDirectory>,
        registry: Arc<dyn ChatRegistry>,
        config: BouncerConfig,
    ) -> Self {
        Self {
            transport,
            directory,
            registry,
            config,
            pending: DashMap::new(),
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Start the join-request flow on its own task.
    ///
    /// A newer request for the same chat and user aborts the older pending
    /// one. Errors are logged here; the handle also yields them.
    pub fn on_join_request(self: &Arc<Self>, request: JoinRequest) -> JoinHandle<BouncerResult<JoinOutcome>> {
        let key = request.key();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let this = Arc::clone(self);
        let (registered_tx, registered_rx) = oneshot::channel::<()>();

        let span = crate::telemetry::spans::join_request(key.0, key.1);

        let flow = async move {
            // Hold off until the entry exists so release() cannot run first.
            let _ = registered_rx.await;
            let result = this.handle_join_request(&request).await;
            this.release(key, ticket);

            match &result {
                Ok(outcome) => crate::metrics::record_join_outcome(outcome.as_str()),
                Err(e) => {
                    error!(
                        chat_id = request.chat_id,
                        user_id = request.requester.id,
                        error = %e,
                        "Join request flow aborted"
                    );
                    crate::metrics::record_flow_error("join_request", e.error_code());
                }
            }
            result
        };
        let handle = tokio::spawn(flow.instrument(span));

        let entry = PendingJoin {
            ticket,
            abort: handle.abort_handle(),
        };
        if let Some(previous) = self.pending.insert(key, entry) {
            debug!(chat_id = key.0, user_id = key.1, "Superseding pending join request");
            previous.abort.abort();
        }
        let _ = registered_tx.send(());
        crate::metrics::set_pending_join_requests(self.pending.len());

        handle
    }

    /// Abort a join request still inside its grace period.
    ///
    /// Returns false when nothing was pending for the pair.
    pub fn cancel(&self, chat_id: i64, user_id: i64) -> bool {
        match self.pending.remove(&(chat_id, user_id)) {
            Some((_, pending)) => {
                pending.abort.abort();
                info!(chat_id, user_id, "Pending join request cancelled");
                crate::metrics::set_pending_join_requests(self.pending.len());
                true
            }
            None => false,
        }
    }

    /// Number of join requests awaiting a decision.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn release(&self, key: (i64, i64), ticket: u64) {
        self.pending.remove_if(&key, |_, pending| pending.ticket == ticket);
        crate::metrics::set_pending_join_requests(self.pending.len());
    }

    /// Handle members added to a chat outside the join-request path.
    pub async fn on_new_members_added(&self, event: NewMembersEvent) -> BouncerResult<Vec<MemberOutcome>> {
        let span = crate::telemetry::spans::direct_invite(event.chat_id, event.members.len());
        let result = self.handle_direct_invite(&event).instrument(span).await;
        if let Err(e) = &result {
            error!(
                chat_id = event.chat_id,
                error = %e,
                "Direct invite flow aborted"
            );
            crate::metrics::record_flow_error("direct_invite", e.error_code());
        }
        result
    }

    /// Every registered chat with its moderated invite link.
    pub async fn on_list_groups_requested(&self) -> Result<Vec<ChatListing>, RegistryError> {
        self.registry.list_chats().await
    }
}
