//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the sync server:
//! - HTTP request metrics (latency, counts, auth failures)
//! - Sync state gauges (collected dynamically)
//! - Core sync and Notion counters, registered from `notionsync_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "notionsync_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notionsync_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "notionsync_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "notionsync_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Sync State (collected dynamically)
// =============================================================================

/// Whether sync is enabled and Notion configured (1) or not (0).
pub static SYNC_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "notionsync_sync_active",
        "Whether event sync is active (1) or inert (0)",
    )
    .unwrap()
});

/// Entries in the sync history.
pub static HISTORY_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "notionsync_history_entries",
        "Number of entries in the sync history",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Sync state
    registry.register(Box::new(SYNC_ACTIVE.clone())).unwrap();
    registry
        .register(Box::new(HISTORY_ENTRIES.clone()))
        .unwrap();

    // Core metrics (sync outcomes, Notion requests)
    notionsync_core::metrics::register_core_metrics(registry);
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SYNC_ACTIVE.set(if state.sync().is_active() { 1 } else { 0 });

    if let Ok(history) = state.sync().history() {
        HISTORY_ENTRIES.set(history.len() as i64);
    }
}

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

/// Normalize a path for metric labels (replace ids and keys with placeholders).
pub fn normalize_path(path: &str) -> String {
    // History keys may be free-form titles.
    if let Some(rest) = path.strip_prefix("/api/v1/history/") {
        if !rest.is_empty() {
            return "/api/v1/history/{key}".to_string();
        }
    }
    UUID.replace_all(path, "{id}").into_owned()
}
