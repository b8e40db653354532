//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Shortest ban the Bot API honours; anything shorter is treated as permanent.
const MIN_BAN_SECS: i64 = 30;

/// Longest ban the Bot API honours; anything longer is treated as permanent.
const MAX_BAN_SECS: i64 = 366 * 24 * 60 * 60;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.token is required (or set BOUNCER_BOT_TOKEN)")]
    MissingBotToken,
    #[error("bot.api_url must be an http(s) URL, got '{0}'")]
    InvalidApiUrl(String),
    #[error("bot.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("bouncer.direct_join_ban_secs must be between 30 and 31622400, got {0}")]
    BanDurationOutOfRange(i64),
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.token.trim().is_empty() {
        errors.push(ValidationError::MissingBotToken);
    }

    let api_url = &config.bot.api_url;
    if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
        errors.push(ValidationError::InvalidApiUrl(api_url.clone()));
    }

    if config.bot.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let ban = config.bouncer.direct_join_ban_secs;
    if !(MIN_BAN_SECS..=MAX_BAN_SECS).contains(&ban) {
        errors.push(ValidationError::BanDurationOutOfRange(ban));
    }

    if config.database.path != ":memory:" {
        let db_path = Path::new(&config.database.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(
                config.database.path.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
