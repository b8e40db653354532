//! Messaging transport abstraction.
//!
//! The bouncer talks to the chat platform only through [`Transport`]. Errors
//! are classified at this boundary so callers match on [`TransportErrorKind`]
//! instead of inspecting platform error text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod telegram;
pub mod types;

pub use telegram::TelegramClient;

/// Text formatting for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }
}

/// Classified cause of a failed transport call.
#[derive(Debug, Error)]
pub enum TransportErrorKind {
    /// The join request was already approved or declined by someone else.
    #[error("join request already resolved")]
    AlreadyResolved,

    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("api error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// A failed transport call.
#[derive(Debug, Error)]
#[error("{method} failed: {kind}")]
pub struct TransportError {
    /// Platform method that was attempted.
    pub method: &'static str,
    #[source]
    pub kind: TransportErrorKind,
}

impl TransportError {
    pub fn new(method: &'static str, kind: TransportErrorKind) -> Self {
        Self { method, kind }
    }

    /// True for the moderator-override race on approve/decline.
    #[inline]
    pub fn is_already_resolved(&self) -> bool {
        matches!(self.kind, TransportErrorKind::AlreadyResolved)
    }

    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            TransportErrorKind::AlreadyResolved => "already_resolved",
            TransportErrorKind::RateLimited { .. } => "rate_limited",
            TransportErrorKind::Api { .. } => "api",
            TransportErrorKind::Http(_) => "http",
            TransportErrorKind::Decode(_) => "decode",
        }
    }
}

/// Outbound operations the bouncer needs from the chat platform.
///
/// Implementations must be safe to call from many tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send text to a chat or to a user's private chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError>;

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError>;

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError>;

    /// Create an invite link. With `moderated` set, every join through the
    /// link becomes a join request.
    async fn create_invite_link(
        &self,
        chat_id: i64,
        moderated: bool,
    ) -> Result<String, TransportError>;

    /// Remove a member and keep them out until `until`.
    async fn ban_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TransportError>;
}
