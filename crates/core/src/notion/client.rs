//! Notion REST API client.
//!
//! Speaks both generations of the API: with `Notion-Version: 2025-09-03`
//! a database exposes its schema through data sources, older versions put
//! `properties` on the database itself. Queries go to the data source first
//! and fall back to the database-scoped endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::types::{
    ApiErrorBody, ConnectionInfo, DatabaseResponse, DatabaseSchema, PageResponse, QueryResponse,
};
use super::{filter_properties, normalize_database_id, NotionError, NotionGateway};
use crate::config::NotionConfig;
use crate::mapper::{props, PropertyMap};
use crate::metrics::NOTION_REQUESTS;

/// Page size for queries (API maximum).
const QUERY_PAGE_SIZE: usize = 100;

/// Upper bound on followed cursors per query.
const MAX_QUERY_PAGES: usize = 50;

/// Rows of one paginated query.
struct QueryResults {
    rows: Vec<Value>,
    /// More rows existed past the page cap.
    truncated: bool,
}

/// Notion API client bound to one database.
pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
    api_version: String,
    database_id: String,
    max_query_pages: usize,
    schema: RwLock<Option<DatabaseSchema>>,
}

impl NotionClient {
    /// Create a client. Fails when the token is empty or the database id
    /// cannot be normalized.
    pub fn new(config: &NotionConfig) -> Result<Self, NotionError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Err(NotionError::NotConfigured(
                "Notion integration token is required".to_string(),
            ));
        }

        let database_id = normalize_database_id(&config.database_id).ok_or_else(|| {
            NotionError::NotConfigured(format!(
                "Invalid Notion database id: '{}'",
                config.database_id
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        info!(
            "Notion client ready for database {}... (API {})",
            &database_id[..8],
            config.api_version
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            api_version: config.api_version.clone(),
            database_id,
            max_query_pages: MAX_QUERY_PAGES,
            schema: RwLock::new(None),
        })
    }

    /// Follow at most `pages` cursors per query.
    pub fn with_max_query_pages(mut self, pages: usize) -> Self {
        self.max_query_pages = pages.max(1);
        self
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, NotionError> {
        let result = self.send_inner(request).await;
        let label = if result.is_ok() { "ok" } else { "error" };
        NOTION_REQUESTS
            .with_label_values(&[operation, label])
            .inc();
        result
    }

    async fn send_inner<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, NotionError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
            let code = parsed
                .as_ref()
                .and_then(|b| b.code.clone())
                .unwrap_or_default();
            let message = parsed
                .and_then(|b| b.message)
                .unwrap_or(body);

            return Err(match status.as_u16() {
                401 | 403 => NotionError::Unauthorized(message),
                404 => NotionError::NotFound(message),
                429 => NotionError::RateLimited,
                other => NotionError::ApiError {
                    status: other,
                    code,
                    message,
                },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| NotionError::ParseError(e.to_string()))
    }

    async fn fetch_schema(&self) -> Result<DatabaseSchema, NotionError> {
        let path = format!("/databases/{}", urlencoding::encode(&self.database_id));
        debug!("Notion retrieve database: {}", self.database_id);

        let database: DatabaseResponse = self
            .send("retrieve_database", self.request(Method::GET, &path))
            .await?;

        match database.data_sources.first() {
            Some(source) => {
                let path = format!("/data_sources/{}", urlencoding::encode(&source.id));
                debug!("Notion retrieve data source: {}", source.id);
                let data_source: Value = self
                    .send("retrieve_data_source", self.request(Method::GET, &path))
                    .await?;
                Ok(DatabaseSchema {
                    database_id: self.database_id.clone(),
                    data_source_id: Some(source.id.clone()),
                    properties: DatabaseSchema::properties_from(&data_source),
                })
            }
            None => Ok(DatabaseSchema {
                database_id: self.database_id.clone(),
                data_source_id: None,
                properties: DatabaseSchema::properties_from(&database.rest),
            }),
        }
    }

    /// Database schema, fetched once and cached.
    pub async fn schema(&self) -> Result<DatabaseSchema, NotionError> {
        if let Some(schema) = self.schema.read().await.as_ref() {
            return Ok(schema.clone());
        }

        let schema = self.fetch_schema().await?;
        info!(
            "Loaded Notion schema: {} properties{}",
            schema.properties.len(),
            schema
                .data_source_id
                .as_deref()
                .map(|id| format!(", data source {}", id))
                .unwrap_or_default()
        );
        *self.schema.write().await = Some(schema.clone());
        Ok(schema)
    }

    /// Forget the cached schema (after the user edits the database).
    pub async fn invalidate_schema(&self) {
        *self.schema.write().await = None;
    }

    async fn prepare_properties(&self, properties: PropertyMap) -> PropertyMap {
        match self.schema().await {
            Ok(schema) => filter_properties(properties, &schema),
            Err(e) => {
                warn!("Could not load Notion schema, sending properties unfiltered: {}", e);
                properties
            }
        }
    }

    async fn try_create_page(&self, properties: PropertyMap) -> Result<String, NotionError> {
        let properties = self.prepare_properties(properties).await;
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });

        let page: PageResponse = self
            .send("create_page", self.request(Method::POST, "/pages").json(&body))
            .await?;
        Ok(page.id)
    }

    async fn try_update_page(
        &self,
        page_id: &str,
        properties: PropertyMap,
    ) -> Result<(), NotionError> {
        let properties = self.prepare_properties(properties).await;
        let path = format!("/pages/{}", urlencoding::encode(page_id));
        let body = json!({ "properties": properties });

        let _: PageResponse = self
            .send("update_page", self.request(Method::PATCH, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn query_endpoint(
        &self,
        operation: &'static str,
        path: &str,
        filter: Option<&Value>,
        limit: Option<usize>,
    ) -> Result<QueryResults, NotionError> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        let mut truncated = false;

        for round in 1..=self.max_query_pages {
            let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
            if let Some(filter) = filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let page: QueryResponse = self
                .send(operation, self.request(Method::POST, path).json(&body))
                .await?;
            results.extend(page.results);

            if limit.is_some_and(|limit| results.len() >= limit) {
                break;
            }
            match (page.has_more, page.next_cursor) {
                (true, Some(_)) if round == self.max_query_pages => {
                    warn!(
                        "{} stopped after {} pages, {} records read and more remain",
                        operation,
                        round,
                        results.len()
                    );
                    truncated = true;
                }
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        if let Some(limit) = limit {
            results.truncate(limit);
        }
        Ok(QueryResults {
            rows: results,
            truncated,
        })
    }

    async fn try_query(
        &self,
        filter: Option<&Value>,
        limit: Option<usize>,
    ) -> Result<QueryResults, NotionError> {
        let data_source_id = match self.schema().await {
            Ok(schema) => schema.data_source_id,
            Err(e) => {
                debug!("Schema unavailable before query: {}", e);
                None
            }
        };

        if let Some(ds) = data_source_id {
            let path = format!("/data_sources/{}/query", urlencoding::encode(&ds));
            match self
                .query_endpoint("query_data_source", &path, filter, limit)
                .await
            {
                Ok(results) => return Ok(results),
                Err(e) => warn!(
                    "Data source query failed, falling back to database query: {}",
                    e
                ),
            }
        }

        let path = format!("/databases/{}/query", urlencoding::encode(&self.database_id));
        self.query_endpoint("query_database", &path, filter, limit)
            .await
    }

    async fn title_property(&self) -> String {
        self.schema()
            .await
            .ok()
            .and_then(|s| s.title_property().map(str::to_string))
            .unwrap_or_else(|| props::TITLE.to_string())
    }
}

#[async_trait]
impl NotionGateway for NotionClient {
    async fn create_page(&self, properties: PropertyMap) -> Option<String> {
        match self.try_create_page(properties).await {
            Ok(page_id) => {
                info!("Notion page created: {}", page_id);
                Some(page_id)
            }
            Err(e) => {
                error!("Failed to create Notion page: {}", e);
                None
            }
        }
    }

    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> bool {
        match self.try_update_page(page_id, properties).await {
            Ok(()) => {
                info!("Notion page updated: {}", page_id);
                true
            }
            Err(e) => {
                error!("Failed to update Notion page {}: {}", page_id, e);
                false
            }
        }
    }

    async fn query_pages(&self, filter: Option<Value>) -> Vec<Value> {
        match self.try_query(filter.as_ref(), None).await {
            Ok(results) => {
                info!("Notion query returned {} records", results.rows.len());
                results.rows
            }
            Err(e) => {
                error!("Failed to query Notion database: {}", e);
                Vec::new()
            }
        }
    }

    async fn find_by_title(&self, title: &str) -> Option<String> {
        let property = self.title_property().await;
        let filter = json!({
            "property": property,
            "title": { "equals": title },
        });

        match self.try_query(Some(&filter), Some(1)).await {
            Ok(results) => {
                let page_id = results
                    .rows
                    .first()
                    .and_then(|page| page.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                if let Some(id) = &page_id {
                    info!("Found existing Notion page for '{}': {}", title, id);
                }
                page_id
            }
            Err(e) => {
                error!("Duplicate check failed for '{}': {}", title, e);
                None
            }
        }
    }

    async fn test_connection(&self) -> Result<ConnectionInfo, NotionError> {
        self.invalidate_schema().await;
        let schema = self.schema().await?;
        let records = self.try_query(None, None).await?;

        Ok(ConnectionInfo {
            database_id: schema.database_id,
            data_source_id: schema.data_source_id,
            property_count: schema.properties.len(),
            record_count: records.rows.len(),
            truncated: records.truncated,
        })
    }
}
