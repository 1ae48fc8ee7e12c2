//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Sync outcomes of transfer-complete events
//! - Notion API calls
//! - Properties dropped because the database does not declare them

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Sync Metrics
// =============================================================================

/// Transfer-complete events by outcome.
pub static SYNC_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "notionsync_sync_events_total",
            "Transfer-complete events handled, by outcome",
        ),
        &["outcome"], // "created", "skipped", "already_synced", "failed", ...
    )
    .unwrap()
});

// =============================================================================
// Notion Metrics
// =============================================================================

/// Notion API calls by operation and result.
pub static NOTION_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notionsync_notion_requests_total", "Notion API requests"),
        &["operation", "result"],
    )
    .unwrap()
});

/// Properties dropped before create/update.
pub static NOTION_DROPPED_PROPERTIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "notionsync_notion_dropped_properties_total",
        "Mapped properties not declared by the Notion database",
    )
    .unwrap()
});

/// Register all core metrics with the given registry.
pub fn register_core_metrics(registry: &prometheus::Registry) {
    registry.register(Box::new(SYNC_EVENTS.clone())).ok();
    registry.register(Box::new(NOTION_REQUESTS.clone())).ok();
    registry
        .register(Box::new(NOTION_DROPPED_PROPERTIES.clone()))
        .ok();
}
