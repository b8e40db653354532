//! Tracing setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` controls filtering (default `info`). With `json` set, events
/// are emitted as one JSON object per line.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors so every flow log line carries its keys.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one join request, from announcement to terminal state.
    pub fn join_request(chat_id: i64, user_id: i64) -> Span {
        info_span!("join_request", chat_id = chat_id, user_id = user_id)
    }

    /// Span for one batch of directly added members.
    pub fn direct_invite(chat_id: i64, members: usize) -> Span {
        info_span!("direct_invite", chat_id = chat_id, members = members)
    }
}
