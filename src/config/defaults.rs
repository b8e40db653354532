//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Bot API Defaults
// =============================================================================

pub fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

pub fn default_poll_timeout() -> u64 {
    30
}

pub fn default_request_timeout() -> u64 {
    10
}

// =============================================================================
// Bouncer Defaults
// =============================================================================

/// Seconds a moderator has to act on a join request before the bot does.
pub fn default_grace_period() -> u64 {
    5
}

/// Seconds a directly-added unauthorized user stays banned.
pub fn default_direct_join_ban() -> i64 {
    60
}

// =============================================================================
// Storage / Metrics Defaults
// =============================================================================

pub fn default_database_path() -> String {
    "bouncer.db".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
