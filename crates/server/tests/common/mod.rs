//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing without Notion or
//! a webhook endpoint.

#![allow(dead_code)]

pub mod fake_notion;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use notionsync_core::{
    testing::{MockNotifier, MockNotionGateway},
    ApiKeyAuthenticator, AuthConfig, Config, DatabaseConfig, NotionConfig, NotionGateway,
    Notifier, ServerConfig, SqliteDataStore, SyncConfig, SyncService,
};

/// API key of the default fixture
pub const TEST_API_KEY: &str = "test-api-key";

/// Re-export fixtures for test convenience
pub use notionsync_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The Notion database (MockNotionGateway)
/// - Notifications (MockNotifier)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_sync() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/api/v1/events/transfer-complete", json!({ "mediainfo": { "title": "Heat" } }))
///         .await;
///
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock Notion gateway - seed pages, inject failures
    pub gateway: Arc<MockNotionGateway>,
    /// Mock notifier - inspect sent notifications
    pub notifier: Arc<MockNotifier>,
    /// API key sent with every authenticated request
    pub api_key: String,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let gateway = Arc::new(MockNotionGateway::new());
        let notifier = Arc::new(MockNotifier::new());

        let auth = AuthConfig {
            api_key: test_config.api_key.clone(),
        };
        let authenticator = Arc::new(
            ApiKeyAuthenticator::from_config(&auth).expect("Failed to create authenticator"),
        );

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            sync: test_config.sync.clone(),
            notion: Some(NotionConfig {
                token: "secret_test_token".to_string(),
                database_id: "0123456789abcdef0123456789abcdef".to_string(),
                ..Default::default()
            }),
            notify: None,
        };

        let store = Arc::new(SqliteDataStore::new(&db_path).expect("Failed to create store"));

        let gateway_for_sync = if test_config.with_gateway {
            Some(Arc::clone(&gateway) as Arc<dyn NotionGateway>)
        } else {
            None
        };

        let sync = Arc::new(SyncService::new(
            test_config.sync,
            gateway_for_sync,
            store,
            Some(Arc::clone(&notifier) as Arc<dyn Notifier>),
        ));

        let state = Arc::new(notionsync_server::state::AppState::new(
            config,
            authenticator,
            sync,
        ));
        let router = notionsync_server::api::create_router(state);

        Self {
            router,
            gateway,
            notifier,
            api_key: test_config.api_key,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, true).await
    }

    /// Send a GET request without credentials.
    pub async fn get_unauthenticated(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, false).await
    }

    /// Send a request of any method without credentials.
    pub async fn unauthenticated(&self, method: &str, path: &str) -> TestResponse {
        self.request(method, path, None, false).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), true).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, true).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = self
            .builder("POST", path, true)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    fn builder(&self, method: &str, path: &str, authenticated: bool) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if authenticated {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        builder
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authenticated: bool,
    ) -> TestResponse {
        let mut request_builder = self.builder(method, path, authenticated);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// API key required on protected routes
    pub api_key: String,
    /// Sync settings (enabled by default)
    pub sync: SyncConfig,
    /// Wire the mock gateway into the sync service
    pub with_gateway: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_key: TEST_API_KEY.to_string(),
            sync: SyncConfig {
                enabled: true,
                ..Default::default()
            },
            with_gateway: true,
        }
    }
}

impl TestConfig {
    /// Create config with a specific API key.
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: key.to_string(),
            ..Default::default()
        }
    }

    /// Create config without a Notion gateway (inert service).
    pub fn without_gateway() -> Self {
        Self {
            with_gateway: false,
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}
