//! Prometheus metrics collection for officer-bouncer.
//!
//! Exposed on the `/metrics` HTTP endpoint when enabled.
//!
//! - `bouncer_join_requests_total{outcome}` - join requests by terminal state
//! - `bouncer_direct_joins_total{action}` - direct additions by action taken
//! - `bouncer_flow_errors_total{flow, error}` - aborted flows
//! - `bouncer_pending_join_requests` - join requests inside their grace window
//! - `bouncer_updates_received_total` / `bouncer_poll_errors_total` - poller health

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Join requests by outcome (approved, declined, overridden).
pub static JOIN_OUTCOMES: OnceLock<IntCounterVec> = OnceLock::new();

/// Directly added members by action (provisioned, removed, admitted).
pub static DIRECT_JOIN_ACTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Flow invocations that aborted on a collaborator error.
pub static FLOW_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Updates received from the Bot API.
pub static UPDATES_RECEIVED: OnceLock<IntCounter> = OnceLock::new();

/// Failed getUpdates calls.
pub static POLL_ERRORS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Join requests currently waiting out their grace period.
pub static PENDING_JOIN_REQUESTS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
/// Recording before `init` is a no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(JOIN_OUTCOMES, IntCounterVec::new(Opts::new("bouncer_join_requests_total", "Join requests by outcome"), &["outcome"]));
    register!(DIRECT_JOIN_ACTIONS, IntCounterVec::new(Opts::new("bouncer_direct_joins_total", "Directly added members by action"), &["action"]));
    register!(FLOW_ERRORS, IntCounterVec::new(Opts::new("bouncer_flow_errors_total", "Aborted flows by error kind"), &["flow", "error"]));
    register!(UPDATES_RECEIVED, IntCounter::new("bouncer_updates_received_total", "Updates received from the Bot API"));
    register!(POLL_ERRORS, IntCounter::new("bouncer_poll_errors_total", "Failed getUpdates calls"));
    register!(PENDING_JOIN_REQUESTS, IntGauge::new("bouncer_pending_join_requests", "Join requests inside their grace window"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a join request reaching a terminal state.
#[inline]
pub fn record_join_outcome(outcome: &str) {
    if let Some(c) = JOIN_OUTCOMES.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

/// Record the action taken for one directly added member.
#[inline]
pub fn record_direct_join(action: &str) {
    if let Some(c) = DIRECT_JOIN_ACTIONS.get() {
        c.with_label_values(&[action]).inc();
    }
}

/// Record an aborted flow.
#[inline]
pub fn record_flow_error(flow: &str, error: &str) {
    if let Some(c) = FLOW_ERRORS.get() {
        c.with_label_values(&[flow, error]).inc();
    }
}

#[inline]
pub fn record_update() {
    if let Some(c) = UPDATES_RECEIVED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_poll_error() {
    if let Some(c) = POLL_ERRORS.get() {
        c.inc();
    }
}

#[inline]
pub fn set_pending_join_requests(count: usize) {
    if let Some(g) = PENDING_JOIN_REQUESTS.get() {
        g.set(count as i64);
    }
}
