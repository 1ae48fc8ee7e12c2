//! In-process stand-in for the Notion REST API.
//!
//! Serves the handful of endpoints the client uses over a real socket so
//! `NotionClient` can be tested end to end: schema retrieval (with or
//! without data sources), paginated queries with a title filter, and page
//! create/update. Every request is recorded.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use notionsync_core::NotionConfig;

pub const DATABASE_ID: &str = "0123456789abcdef0123456789abcdef";
pub const DATA_SOURCE_ID: &str = "ds-0001";
pub const TOKEN: &str = "secret_fake_token";

/// One request as received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
    pub notion_version: Option<String>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// Expose the schema through a data source (2025-09-03 API)
    pub with_data_source: bool,
    /// Data source queries answer 400
    pub fail_data_source_query: bool,
    /// Page creation answers 400
    pub fail_create: bool,
    /// (page id, title)
    pub pages: Vec<(String, String)>,
    pub requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeNotion {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl FakeNotion {
    pub async fn start(with_data_source: bool) -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            with_data_source,
            ..Default::default()
        }));

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Client config pointing at this server.
    pub fn config(&self) -> NotionConfig {
        NotionConfig {
            token: TOKEN.to_string(),
            database_id: format!("https://www.notion.so/team/Media-{}?v=abc", DATABASE_ID),
            base_url: self.base_url(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    pub fn add_pages(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        for i in 0..count {
            let n = state.pages.len();
            state.pages.push((format!("page-{}", n), format!("Item {}", i)));
        }
    }

    pub fn add_page(&self, id: &str, title: &str) {
        self.state
            .lock()
            .unwrap()
            .pages
            .push((id.to_string(), title.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Recorded requests whose path ends with `suffix`, by method.
    pub fn requests_to(&self, method: &str, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .collect()
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub fn set_fail_data_source_query(&self, fail: bool) {
        self.state.lock().unwrap().fail_data_source_query = fail;
    }
}

fn schema_properties() -> Value {
    json!({
        "标题": { "id": "title", "type": "title", "title": {} },
        "类型": { "id": "a", "type": "select", "select": { "options": [] } },
        "年份": { "id": "b", "type": "number", "number": {} },
        "季数": { "id": "c", "type": "number", "number": {} },
        "评分": { "id": "d", "type": "number", "number": {} },
        "TMDB ID": { "id": "e", "type": "rich_text", "rich_text": {} },
        "数据源": { "id": "f", "type": "select", "select": { "options": [] } }
    })
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "object": "error",
            "status": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
        .into_response()
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        body: body.clone(),
        authorization: header("authorization"),
        notion_version: header("notion-version"),
    });

    let expected = format!("Bearer {}", TOKEN);
    if header("authorization").as_deref() != Some(expected.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "unauthorized", "API token is invalid.");
    }

    let database_path = format!("/v1/databases/{}", DATABASE_ID);
    let data_source_path = format!("/v1/data_sources/{}", DATA_SOURCE_ID);

    match (method.as_str(), path.as_str()) {
        ("GET", p) if p == database_path => {
            if state.with_data_source {
                Json(json!({
                    "object": "database",
                    "id": DATABASE_ID,
                    "data_sources": [{ "id": DATA_SOURCE_ID, "name": "Media" }]
                }))
                .into_response()
            } else {
                Json(json!({
                    "object": "database",
                    "id": DATABASE_ID,
                    "properties": schema_properties()
                }))
                .into_response()
            }
        }
        ("GET", p) if p == data_source_path && state.with_data_source => Json(json!({
            "object": "data_source",
            "id": DATA_SOURCE_ID,
            "properties": schema_properties()
        }))
        .into_response(),
        ("POST", p) if p == format!("{}/query", data_source_path) => {
            if state.fail_data_source_query {
                return error(StatusCode::BAD_REQUEST, "invalid_request_url", "Invalid request URL.");
            }
            query(&state, &body)
        }
        ("POST", p) if p == format!("{}/query", database_path) => query(&state, &body),
        ("POST", "/v1/pages") => {
            if state.fail_create {
                return error(StatusCode::BAD_REQUEST, "validation_error", "Invalid property.");
            }
            let title = body
                .pointer("/properties/标题/title/0/text/content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let id = format!("page-{}", state.pages.len());
            state.pages.push((id.clone(), title));
            Json(json!({ "object": "page", "id": id })).into_response()
        }
        ("PATCH", p) if p.starts_with("/v1/pages/") => {
            let id = p.trim_start_matches("/v1/pages/").to_string();
            if state.pages.iter().any(|(page_id, _)| *page_id == id) {
                Json(json!({ "object": "page", "id": id })).into_response()
            } else {
                error(StatusCode::NOT_FOUND, "object_not_found", "Could not find page.")
            }
        }
        _ => error(StatusCode::NOT_FOUND, "object_not_found", "Could not find object."),
    }
}

fn query(state: &FakeState, body: &Value) -> Response {
    let wanted = body
        .pointer("/filter/title/equals")
        .and_then(Value::as_str);
    let matching: Vec<&(String, String)> = state
        .pages
        .iter()
        .filter(|(_, title)| wanted.is_none_or(|w| w == title))
        .collect();

    let page_size = body
        .get("page_size")
        .and_then(Value::as_u64)
        .unwrap_or(100) as usize;
    let offset = body
        .get("start_cursor")
        .and_then(Value::as_str)
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(0);

    let end = (offset + page_size).min(matching.len());
    let results: Vec<Value> = matching[offset.min(end)..end]
        .iter()
        .map(|(id, title)| {
            json!({
                "object": "page",
                "id": id,
                "properties": { "标题": { "title": [{ "plain_text": title }] } }
            })
        })
        .collect();
    let has_more = end < matching.len();

    Json(json!({
        "object": "list",
        "results": results,
        "has_more": has_more,
        "next_cursor": if has_more { Some(end.to_string()) } else { None },
    }))
    .into_response()
}
