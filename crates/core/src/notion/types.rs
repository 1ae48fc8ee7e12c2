//! Types for Notion API responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared properties of the target database, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Normalized 32-hex database id.
    pub database_id: String,
    /// First data source of the database (2025-09-03 API), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    /// Property name → Notion property type ("title", "number", ...).
    pub properties: BTreeMap<String, String>,
}

impl DatabaseSchema {
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Name of the property whose type is `title`.
    pub fn title_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, kind)| kind.as_str() == "title")
            .map(|(name, _)| name.as_str())
    }

    /// Read the `properties` object of a database or data source response.
    pub fn properties_from(value: &Value) -> BTreeMap<String, String> {
        value
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, prop)| {
                        let kind = prop
                            .get("type")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown")
                            .to_string();
                        (name.clone(), kind)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Result of a successful connection test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub database_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    pub property_count: usize,
    pub record_count: usize,
    /// The query stopped at the page cap, so `record_count` is a lower bound.
    #[serde(default)]
    pub truncated: bool,
}

/// `GET /databases/{id}` response (both API generations).
#[derive(Debug, Deserialize)]
pub(crate) struct DatabaseResponse {
    #[serde(default)]
    pub data_sources: Vec<DataSourceRef>,
    #[serde(flatten)]
    pub rest: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataSourceRef {
    pub id: String,
}

/// Paginated query response.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// `POST /pages` response; only the id matters.
#[derive(Debug, Deserialize)]
pub(crate) struct PageResponse {
    pub id: String,
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
