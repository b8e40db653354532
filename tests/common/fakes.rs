//! Recording fakes for the bouncer's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use officer_bouncer::directory::{DirectoryError, OfficerRecord, UserDirectory, UserRecord};
use officer_bouncer::registry::{ChatListing, ChatRegistry, ManagedChat, RegistryError};
use officer_bouncer::transport::{ParseMode, Transport, TransportError, TransportErrorKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    SendMessage {
        chat_id: i64,
        text: String,
        parse_mode: Option<ParseMode>,
    },
    Approve {
        chat_id: i64,
        user_id: i64,
    },
    Decline {
        chat_id: i64,
        user_id: i64,
    },
    CreateInviteLink {
        chat_id: i64,
        moderated: bool,
    },
    Ban {
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    },
}

/// Scripted failure for one transport method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A moderator got there first.
    AlreadyResolved,
    /// Any other platform rejection.
    BadRequest,
}

impl Failure {
    fn into_error(self, method: &'static str) -> TransportError {
        let kind = match self {
            Failure::AlreadyResolved => TransportErrorKind::AlreadyResolved,
            Failure::BadRequest => TransportErrorKind::Api {
                code: 400,
                description: "Bad Request: chat not found".to_string(),
            },
        };
        TransportError::new(method, kind)
    }
}

/// Records every call; methods fail only when scripted to.
#[derive(Default)]
pub struct FakeTransport {
    calls: Mutex<Vec<TransportCall>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    links_created: AtomicUsize,
}

impl FakeTransport {
    /// Make every later call to `method` fail. Method names match the
    /// [`Transport`] trait.
    pub fn fail(&self, method: &'static str, failure: Failure) {
        self.failures.lock().insert(method, failure);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().clone()
    }

    pub fn approvals(&self) -> Vec<(i64, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Approve { chat_id, user_id } => Some((chat_id, user_id)),
                _ => None,
            })
            .collect()
    }

    pub fn declines(&self) -> Vec<(i64, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Decline { chat_id, user_id } => Some((chat_id, user_id)),
                _ => None,
            })
            .collect()
    }

    pub fn bans(&self) -> Vec<(i64, i64, DateTime<Utc>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Ban {
                    chat_id,
                    user_id,
                    until,
                } => Some((chat_id, user_id, until)),
                _ => None,
            })
            .collect()
    }

    /// Texts sent to `chat_id`, in order.
    pub fn messages_to(&self, target: i64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::SendMessage { chat_id, text, .. } if chat_id == target => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, method: &'static str, call: TransportCall) -> Result<(), TransportError> {
        self.calls.lock().push(call);
        match self.failures.lock().get(method) {
            Some(failure) => Err(failure.into_error(method)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError> {
        self.record(
            "send_message",
            TransportCall::SendMessage {
                chat_id,
                text: text.to_string(),
                parse_mode,
            },
        )
    }

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError> {
        self.record(
            "approve_join_request",
            TransportCall::Approve { chat_id, user_id },
        )
    }

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError> {
        self.record(
            "decline_join_request",
            TransportCall::Decline { chat_id, user_id },
        )
    }

    async fn create_invite_link(
        &self,
        chat_id: i64,
        moderated: bool,
    ) -> Result<String, TransportError> {
        self.record(
            "create_invite_link",
            TransportCall::CreateInviteLink { chat_id, moderated },
        )?;
        let n = self.links_created.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(format!("https://t.me/+link{}", n))
    }

    async fn ban_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        self.record(
            "ban_member",
            TransportCall::Ban {
                chat_id,
                user_id,
                until,
            },
        )
    }
}

// ============================================================================
// Directory
// ============================================================================

#[derive(Default)]
pub struct FakeDirectory {
    users: Mutex<HashMap<i64, UserRecord>>,
    unavailable: Mutex<bool>,
    lookups: AtomicUsize,
}

impl FakeDirectory {
    /// Register a user holding one officer credential.
    pub fn add_officer(&self, user_id: i64) {
        self.users.lock().insert(
            user_id,
            UserRecord {
                user_id,
                officer_records: vec![OfficerRecord {
                    agency: "GovTech".to_string(),
                    department: "Engineering".to_string(),
                    title: "Engineer".to_string(),
                }],
            },
        );
    }

    /// Register a user with no credentials.
    pub fn add_unverified(&self, user_id: i64) {
        self.users.lock().insert(
            user_id,
            UserRecord {
                user_id,
                officer_records: Vec::new(),
            },
        );
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock() = unavailable;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn get(&self, user_id: i64) -> Result<Option<UserRecord>, DirectoryError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if *self.unavailable.lock() {
            return Err(DirectoryError::Backend("connection refused".to_string()));
        }
        Ok(self.users.lock().get(&user_id).cloned())
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Default)]
pub struct FakeRegistry {
    chats: Mutex<Vec<ManagedChat>>,
    read_only: Mutex<bool>,
}

impl FakeRegistry {
    pub fn chats(&self) -> Vec<ManagedChat> {
        self.chats.lock().clone()
    }

    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.lock() = read_only;
    }
}

#[async_trait]
impl ChatRegistry for FakeRegistry {
    async fn insert_chat(&self, chat: ManagedChat) -> Result<(), RegistryError> {
        if *self.read_only.lock() {
            return Err(RegistryError::Backend("database is locked".to_string()));
        }
        self.chats.lock().push(chat);
        Ok(())
    }

    async fn list_chats(&self) -> Result<Vec<ChatListing>, RegistryError> {
        Ok(self
            .chats
            .lock()
            .iter()
            .map(|c| ChatListing {
                name: c.name.clone(),
                invite_link: c.invite_link.clone(),
            })
            .collect())
    }
}
