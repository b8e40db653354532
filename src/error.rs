//! Unified error handling for the bouncer flows.
//!
//! Every variant carries the chat/user it was acting on so the log line
//! alone is enough to diagnose an aborted flow.

use crate::directory::DirectoryError;
use crate::registry::RegistryError;
use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;

/// Transport action a flow was attempting when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AnnouncePending,
    Approve,
    AnnounceApproved,
    Decline,
    AnnounceDeclined,
    PromptRequester,
    AnnounceOverride,
    CreateInviteLink,
    Ban,
    AnnounceRemoval,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnnouncePending => "announce_pending",
            Self::Approve => "approve",
            Self::AnnounceApproved => "announce_approved",
            Self::Decline => "decline",
            Self::AnnounceDeclined => "announce_declined",
            Self::PromptRequester => "prompt_requester",
            Self::AnnounceOverride => "announce_override",
            Self::CreateInviteLink => "create_invite_link",
            Self::Ban => "ban",
            Self::AnnounceRemoval => "announce_removal",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a flow invocation.
#[derive(Debug, Error)]
pub enum BouncerError {
    #[error("{action} failed (chat {chat_id}, user {user_id}): {source}")]
    Transport {
        action: Action,
        chat_id: i64,
        user_id: i64,
        #[source]
        source: TransportError,
    },

    #[error("directory lookup failed (user {user_id}): {source}")]
    Directory {
        user_id: i64,
        #[source]
        source: DirectoryError,
    },

    #[error("registering chat {chat_id} failed: {source}")]
    Registry {
        chat_id: i64,
        #[source]
        source: RegistryError,
    },
}

impl BouncerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { source, .. } => source.error_code(),
            Self::Directory { .. } => "directory",
            Self::Registry { .. } => "registry",
        }
    }
}

/// Attach flow context to a transport result.
pub(crate) trait TransportResultExt<T> {
    fn during(self, action: Action, chat_id: i64, user_id: i64) -> Result<T, BouncerError>;
}

impl<T> TransportResultExt<T> for Result<T, TransportError> {
    #[inline]
    fn during(self, action: Action, chat_id: i64, user_id: i64) -> Result<T, BouncerError> {
        self.map_err(|source| BouncerError::Transport {
            action,
            chat_id,
            user_id,
            source,
        })
    }
}

/// Result type for flow entry points.
pub type BouncerResult<T> = Result<T, BouncerError>;
