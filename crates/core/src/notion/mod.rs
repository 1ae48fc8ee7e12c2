//! Notion integration.
//!
//! [`NotionGateway`] is the seam the sync service talks to. Implementations
//! catch and log every remote failure and hand back a sentinel (`None`,
//! `false`, empty list); only [`NotionGateway::test_connection`] reports the
//! error itself, because reporting it is its whole purpose.

mod client;
mod types;

pub use client::NotionClient;
pub use types::{ConnectionInfo, DatabaseSchema};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::mapper::PropertyMap;
use crate::metrics::NOTION_DROPPED_PROPERTIES;

/// Errors that can occur when talking to Notion.
#[derive(Debug, Error)]
pub enum NotionError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Token rejected or integration not shared with the database.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Object not found (or not shared with the integration).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} {code} - {message}")]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured (missing token, bad database id).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Remote store the sync service writes media pages into.
#[async_trait]
pub trait NotionGateway: Send + Sync {
    /// Create a page in the database. Returns the page id.
    async fn create_page(&self, properties: PropertyMap) -> Option<String>;

    /// Overwrite properties of an existing page.
    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> bool;

    /// Query pages, optionally with a Notion filter object.
    async fn query_pages(&self, filter: Option<Value>) -> Vec<Value>;

    /// Id of the first page whose title equals `title`.
    async fn find_by_title(&self, title: &str) -> Option<String>;

    /// Check token, database access and query permission.
    async fn test_connection(&self) -> Result<ConnectionInfo, NotionError>;
}

static NOTION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([0-9a-f]{8}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{12})/?$",
    )
    .unwrap()
});

/// Normalize a database id, dashed UUID or database URL to 32 lowercase hex.
pub fn normalize_database_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed);
    let id = NOTION_ID.captures(path)?.get(1)?.as_str();
    Some(id.replace('-', "").to_lowercase())
}

/// Drop properties the database does not declare.
pub fn filter_properties(properties: PropertyMap, schema: &DatabaseSchema) -> PropertyMap {
    let mut kept = PropertyMap::new();
    for (name, value) in properties {
        if schema.has_property(&name) {
            kept.insert(name, value);
        } else {
            warn!(
                "Dropping property '{}': not defined in Notion database {}",
                name, schema.database_id
            );
            NOTION_DROPPED_PROPERTIES.inc();
        }
    }
    kept
}
