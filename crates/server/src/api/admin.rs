//! History, dedup cache and connection check.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use notionsync_core::{ConnectionInfo, DeleteOutcome, HistoryItemView, NotionError};
use serde::Serialize;
use tracing::{error, info};

use super::handlers::{api_error, ApiError, ApiResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

/// GET /api/v1/history
///
/// Newest first, with status label and color.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<HistoryItemView>>>, ApiError> {
    match state.sync().history() {
        Ok(items) => Ok(Json(ApiResponse::ok(
            format!("{} entries", items.len()),
            items,
        ))),
        Err(e) => {
            error!("Failed to read history: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// DELETE /api/v1/history/{key}
///
/// Removes every entry whose page id or title equals the key.
pub async fn delete_history(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<RemovedResponse>>, ApiError> {
    match state.sync().delete_history(&key) {
        Ok(DeleteOutcome::NoHistory) => Err(api_error(StatusCode::NOT_FOUND, "No history found")),
        Ok(DeleteOutcome::Removed(removed)) => {
            info!("{} deleted {} history entries for {}", user, removed, key);
            Ok(Json(ApiResponse::ok(
                "Deleted",
                RemovedResponse { removed },
            )))
        }
        Err(e) => {
            error!("Failed to delete history: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// POST /api/v1/cache/clear
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<ClearedResponse>>, ApiError> {
    match state.sync().clear_synced_keys().await {
        Ok(cleared) => {
            info!("{} cleared the synced-key cache", user);
            Ok(Json(ApiResponse::ok(
                format!("Cleared {} synced keys", cleared),
                ClearedResponse { cleared },
            )))
        }
        Err(e) => {
            error!("Failed to clear synced keys: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /api/v1/test-connection
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ConnectionInfo>>, ApiError> {
    match state.sync().test_connection().await {
        Ok(info) => {
            let message = if info.truncated {
                format!("Connected, database has at least {} records", info.record_count)
            } else {
                format!("Connected, database has {} records", info.record_count)
            };
            Ok(Json(ApiResponse::ok(message, info)))
        }
        Err(NotionError::NotConfigured(message)) => Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Notion client not initialized: {}", message),
        )),
        Err(e) => Err(api_error(
            StatusCode::BAD_GATEWAY,
            format!("Connection failed: {}", e),
        )),
    }
}
