use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use notionsync_core::SanitizedConfig;
use serde::Serialize;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

/// Envelope of every administrative response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
        }
    }
}

/// Error half of handler results.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::fail(message, None)))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sync_active: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sync_active: state.sync().is_active(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// One administrative operation exposed to the media manager.
#[derive(Debug, Clone, Serialize)]
pub struct OpInfo {
    pub path: &'static str,
    pub method: &'static str,
    pub summary: &'static str,
}

pub const OPS: &[OpInfo] = &[
    OpInfo {
        path: "/api/v1/history",
        method: "GET",
        summary: "List sync history",
    },
    OpInfo {
        path: "/api/v1/history/{key}",
        method: "DELETE",
        summary: "Delete sync history entries by page id or title",
    },
    OpInfo {
        path: "/api/v1/cache/clear",
        method: "POST",
        summary: "Clear the synced-key cache",
    },
    OpInfo {
        path: "/api/v1/test-connection",
        method: "GET",
        summary: "Test the Notion connection",
    },
];

/// GET /api/v1/ops
pub async fn list_ops() -> Json<ApiResponse<&'static [OpInfo]>> {
    Json(ApiResponse::ok(format!("{} operations", OPS.len()), OPS))
}

/// GET /api/v1/metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
