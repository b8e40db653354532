//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_api_url, default_database_path, default_direct_join_ban, default_grace_period,
    default_metrics_port, default_poll_timeout, default_request_timeout,
};

/// Environment variable that overrides `bot.token`.
pub const TOKEN_ENV_VAR: &str = "BOUNCER_BOT_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot API credentials and polling.
    pub bot: BotConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Join gating timings.
    #[serde(default)]
    pub bouncer: BouncerConfig,
    /// Prometheus endpoint.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR)
            && !token.is_empty()
        {
            config.bot.token = token;
        }
        Ok(config)
    }
}

/// Bot API configuration.
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    /// Token issued by BotFather. May be left empty and supplied via
    /// `BOUNCER_BOT_TOKEN`.
    #[serde(default)]
    pub token: String,
    /// API root, overridable for a local Bot API server.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout passed to getUpdates.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Timeout for every other API call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Keeps the token out of logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Join gating configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BouncerConfig {
    /// Seconds a moderator has to override a join request (default: 5).
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,
    /// Seconds an unauthorized direct joiner stays banned (default: 60).
    #[serde(default = "default_direct_join_ban")]
    pub direct_join_ban_secs: i64,
}

impl BouncerConfig {
    #[inline]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    #[inline]
    pub fn direct_join_ban(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.direct_join_ban_secs)
    }
}

impl Default for BouncerConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period(),
            direct_join_ban_secs: default_direct_join_ban(),
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// HTTP port for `/metrics`; 0 disables the endpoint.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}
