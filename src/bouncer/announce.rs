//! Chat announcements and private prompts.
//!
//! Chat-facing texts use legacy Markdown so the requester's name renders as
//! a mention link.

use super::UserIdentity;
use crate::registry::ChatListing;
use std::time::Duration;

/// Sent to a declined requester's private chat.
pub const VERIFY_PROMPT: &str =
    "Please verify your identity and join the group via the link provided! Use \"/start\" to begin";

/// Reply to `/invites` from someone who is not a verified officer.
pub const INVITES_UNVERIFIED: &str =
    "Only verified public officers can list groups. Use \"/start\" to verify your identity";

/// Escape the characters legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '*' | '`' | '[' => {
                out.push('\\');
                out.push(c);
            }
            // Would close the link text early; cannot be escaped in legacy mode.
            ']' => out.push(')'),
            _ => out.push(c),
        }
    }
    out
}

/// `[name](tg://user?id=N)`
pub fn mention(user: &UserIdentity) -> String {
    format!(
        "[{}](tg://user?id={})",
        escape_markdown(&user.display_name),
        user.id
    )
}

pub fn join_pending(user: &UserIdentity, grace: Duration) -> String {
    format!(
        "User {} is attempting to join the chat: please accept/reject in the next {} seconds to override",
        mention(user),
        grace.as_secs()
    )
}

pub fn join_approved(user: &UserIdentity) -> String {
    format!(
        "User {} is a verified public officer and has joined the chat",
        mention(user)
    )
}

pub fn join_declined(user: &UserIdentity) -> String {
    format!(
        "User {} is unauthorized to join this chat: rejecting request",
        mention(user)
    )
}

pub fn join_overridden(user: &UserIdentity) -> String {
    format!("Join request overridden for User {}", mention(user))
}

pub fn direct_join_removed(user: &UserIdentity) -> String {
    format!(
        "User {} is unauthorized and attempted to join chat via direct link: removing from group",
        mention(user)
    )
}

/// Plain-text listing, one `name: link` line per chat.
pub fn invite_listing(chats: &[ChatListing]) -> String {
    if chats.is_empty() {
        return "No groups are available yet.".to_string();
    }
    let lines: Vec<String> = chats
        .iter()
        .map(|chat| format!("{}: {}", chat.name, chat.invite_link))
        .collect();
    format!("You can join the following groups:\n\n{}", lines.join("\n"))
}
