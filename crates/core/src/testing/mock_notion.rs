//! Mock Notion gateway for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::mapper::{props, PropertyMap};
use crate::notion::{ConnectionInfo, NotionError, NotionGateway};

/// A page held by the mock.
#[derive(Debug, Clone)]
struct MockPage {
    id: String,
    title: String,
    properties: PropertyMap,
}

/// Mock implementation of the NotionGateway trait.
///
/// Provides controllable behavior for testing:
/// - Pages created through it are found by later title checks
/// - Pre-seeded "existing" pages
/// - Failing creates and a slow create path for concurrency tests
/// - Recorded creates, updates and title queries for assertions
#[derive(Debug)]
pub struct MockNotionGateway {
    pages: Arc<RwLock<Vec<MockPage>>>,
    created: Arc<RwLock<Vec<PropertyMap>>>,
    updated: Arc<RwLock<Vec<(String, PropertyMap)>>>,
    title_queries: Arc<RwLock<Vec<String>>>,
    fail_creates: Arc<RwLock<bool>>,
    create_delay: Arc<RwLock<Option<Duration>>>,
    /// If set, the next test_connection will fail with this error.
    next_error: Arc<RwLock<Option<NotionError>>>,
}

impl Default for MockNotionGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotionGateway {
    pub fn new() -> Self {
        Self {
            pages: Arc::new(RwLock::new(Vec::new())),
            created: Arc::new(RwLock::new(Vec::new())),
            updated: Arc::new(RwLock::new(Vec::new())),
            title_queries: Arc::new(RwLock::new(Vec::new())),
            fail_creates: Arc::new(RwLock::new(false)),
            create_delay: Arc::new(RwLock::new(None)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Seed a page that already exists in the database.
    pub async fn add_existing(&self, title: &str, page_id: &str) {
        self.pages.write().await.push(MockPage {
            id: page_id.to_string(),
            title: title.to_string(),
            properties: PropertyMap::new(),
        });
    }

    pub async fn set_fail_creates(&self, fail: bool) {
        *self.fail_creates.write().await = fail;
    }

    /// Make every create sleep before answering.
    pub async fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.write().await = Some(delay);
    }

    pub async fn set_next_error(&self, error: NotionError) {
        *self.next_error.write().await = Some(error);
    }

    /// Property maps of every successful create, in order.
    pub async fn created_pages(&self) -> Vec<PropertyMap> {
        self.created.read().await.clone()
    }

    pub async fn updated_pages(&self) -> Vec<(String, PropertyMap)> {
        self.updated.read().await.clone()
    }

    pub async fn title_queries(&self) -> Vec<String> {
        self.title_queries.read().await.clone()
    }
}

fn title_of(properties: &PropertyMap) -> String {
    properties
        .get(props::TITLE)
        .and_then(|p| p.pointer("/title/0/text/content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl NotionGateway for MockNotionGateway {
    async fn create_page(&self, properties: PropertyMap) -> Option<String> {
        let delay = *self.create_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_creates.read().await {
            return None;
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.pages.write().await.push(MockPage {
            id: id.clone(),
            title: title_of(&properties),
            properties: properties.clone(),
        });
        self.created.write().await.push(properties);
        Some(id)
    }

    async fn update_page(&self, page_id: &str, properties: PropertyMap) -> bool {
        let mut pages = self.pages.write().await;
        let Some(page) = pages.iter_mut().find(|p| p.id == page_id) else {
            return false;
        };
        page.properties.extend(properties.clone());
        self.updated
            .write()
            .await
            .push((page_id.to_string(), properties));
        true
    }

    async fn query_pages(&self, _filter: Option<Value>) -> Vec<Value> {
        self.pages
            .read()
            .await
            .iter()
            .map(|p| json!({ "object": "page", "id": p.id, "properties": p.properties }))
            .collect()
    }

    async fn find_by_title(&self, title: &str) -> Option<String> {
        self.title_queries.write().await.push(title.to_string());
        self.pages
            .read()
            .await
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.id.clone())
    }

    async fn test_connection(&self) -> Result<ConnectionInfo, NotionError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(ConnectionInfo {
            database_id: "0123456789abcdef0123456789abcdef".to_string(),
            data_source_id: None,
            property_count: 16,
            record_count: self.pages.read().await.len(),
            truncated: false,
        })
    }
}
