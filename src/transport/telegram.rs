//! Telegram Bot API transport.
//!
//! Every method is a JSON POST to `{api_url}/bot{token}/{method}`. Error
//! envelopes are turned into [`TransportErrorKind`] here and nowhere else.

use super::types::{ApiResponse, ChatInviteLink, Update, User};
use super::{ParseMode, Transport, TransportError, TransportErrorKind};
use crate::config::BotConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Description the Bot API returns when approving or declining a join
/// request that a chat admin has already handled.
const REQUEST_ALREADY_HANDLED: &str = "HIDE_REQUESTER_MISSING";

/// Slack added on top of the long-poll timeout for the HTTP request itself.
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Bot API client.
pub struct TelegramClient {
    http: reqwest::Client,
    /// `{api_url}/bot{token}`; never logged.
    base_url: String,
}

impl TelegramClient {
    /// Build a client from the bot configuration.
    pub fn new(config: &BotConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("officer-bouncer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::new("client", TransportErrorKind::Http(e)))?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.token
            ),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: Value,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError> {
        let url = format!("{}/{}", self.base_url, method);
        let mut request = self.http.post(url).json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Strip the URL from reqwest errors: it embeds the token.
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(method, TransportErrorKind::Http(e.without_url())))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            TransportError::new(
                method,
                TransportErrorKind::Decode(format!("status {}: {}", status, e.without_url())),
            )
        })?;

        if envelope.ok {
            return envelope.result.ok_or_else(|| {
                TransportError::new(
                    method,
                    TransportErrorKind::Decode("ok response without result".to_string()),
                )
            });
        }

        let code = envelope
            .error_code
            .unwrap_or_else(|| i64::from(status.as_u16()));
        let description = envelope.description.unwrap_or_default();
        let retry_after = envelope.parameters.and_then(|p| p.retry_after);
        debug!(method, code, description = %description, "Bot API call rejected");

        Err(TransportError::new(
            method,
            classify(code, &description, retry_after),
        ))
    }

    /// Identity of the bot behind the token.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", json!({}), None).await
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "chat_join_request"],
            }),
            Some(Duration::from_secs(timeout_secs) + POLL_SLACK),
        )
        .await
    }
}

/// Map a Bot API error envelope to a transport error kind.
pub fn classify(code: i64, description: &str, retry_after: Option<u64>) -> TransportErrorKind {
    if description.contains(REQUEST_ALREADY_HANDLED) {
        return TransportErrorKind::AlreadyResolved;
    }
    if code == 429 {
        return TransportErrorKind::RateLimited {
            retry_after: retry_after.unwrap_or(1),
        };
    }
    TransportErrorKind::Api {
        code,
        description: description.to_string(),
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), TransportError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode.as_str());
        }
        let _: Value = self.call("sendMessage", body, None).await?;
        Ok(())
    }

    async fn approve_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "approveChatJoinRequest",
                json!({ "chat_id": chat_id, "user_id": user_id }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn decline_join_request(&self, chat_id: i64, user_id: i64) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "declineChatJoinRequest",
                json!({ "chat_id": chat_id, "user_id": user_id }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn create_invite_link(
        &self,
        chat_id: i64,
        moderated: bool,
    ) -> Result<String, TransportError> {
        let link: ChatInviteLink = self
            .call(
                "createChatInviteLink",
                json!({ "chat_id": chat_id, "creates_join_request": moderated }),
                None,
            )
            .await?;
        if link.creates_join_request != moderated {
            warn!(chat_id, moderated, "Invite link moderation flag not honoured");
        }
        Ok(link.invite_link)
    }

    async fn ban_member(
        &self,
        chat_id: i64,
        user_id: i64,
        until: DateTime<Utc>,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "banChatMember",
                json!({
                    "chat_id": chat_id,
                    "user_id": user_id,
                    "until_date": until.timestamp(),
                }),
                None,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_already_handled() {
        let kind = classify(400, "Bad Request: HIDE_REQUESTER_MISSING", None);
        assert!(matches!(kind, TransportErrorKind::AlreadyResolved));
    }

    #[test]
    fn test_classify_rate_limit() {
        let kind = classify(429, "Too Many Requests: retry after 7", Some(7));
        assert!(matches!(
            kind,
            TransportErrorKind::RateLimited { retry_after: 7 }
        ));
    }

    #[test]
    fn test_classify_other_bad_request() {
        let kind = classify(400, "Bad Request: USER_ALREADY_PARTICIPANT", None);
        match kind {
            TransportErrorKind::Api { code, description } => {
                assert_eq!(code, 400);
                assert!(description.contains("USER_ALREADY_PARTICIPANT"));
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_error_envelope_parses() {
        let body = r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 3","parameters":{"retry_after":3}}"#;
        let envelope: ApiResponse<bool> = serde_json::from_str(body).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.error_code, Some(429));
        assert_eq!(envelope.parameters.and_then(|p| p.retry_after), Some(3));
    }

    #[test]
    fn test_join_request_update_parses() {
        let body = r#"{
            "update_id": 10,
            "chat_join_request": {
                "chat": {"id": -100123, "type": "supergroup", "title": "Ops"},
                "from": {"id": 7, "is_bot": false, "first_name": "Alice"},
                "user_chat_id": 7,
                "date": 1700000000
            }
        }"#;
        let update: Update = serde_json::from_str(body).unwrap();
        let request = update.chat_join_request.unwrap();
        assert_eq!(request.chat.id, -100123);
        assert_eq!(request.from.first_name, "Alice");
        assert_eq!(request.user_chat_id, 7);
    }
}
