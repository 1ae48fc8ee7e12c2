//! Media manager event intake.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use notionsync_core::{SyncOutcome, TransferCompleteEvent};
use tracing::debug;

use super::handlers::ApiResponse;
use super::middleware::AuthUser;
use crate::state::AppState;

/// POST /api/v1/events/transfer-complete
///
/// Runs the sync inline and reports what happened. Only a payload without
/// `mediainfo` is a client error; every other outcome answers 200.
pub async fn transfer_complete(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(event): Json<TransferCompleteEvent>,
) -> (StatusCode, Json<ApiResponse<SyncOutcome>>) {
    debug!("Transfer-complete event from {}", user);

    let outcome = state.sync().handle_transfer_complete(&event).await;
    let message = describe(&outcome);

    match outcome {
        SyncOutcome::InvalidEvent => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::fail(message, Some(outcome))),
        ),
        SyncOutcome::Failed { .. } => (
            StatusCode::OK,
            Json(ApiResponse::fail(message, Some(outcome))),
        ),
        _ => (StatusCode::OK, Json(ApiResponse::ok(message, outcome))),
    }
}

fn describe(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Inactive => "Sync inactive".to_string(),
        SyncOutcome::Filtered { media_type } => format!("Media type {} filtered", media_type),
        SyncOutcome::InvalidEvent => "Event has no mediainfo".to_string(),
        SyncOutcome::AlreadySynced { key } => format!("Already synced ({})", key),
        SyncOutcome::Skipped { page_id } => format!("Already in Notion ({})", page_id),
        SyncOutcome::Created { page_id } => format!("Synced ({})", page_id),
        SyncOutcome::Failed { reason } => format!("Sync failed: {}", reason),
    }
}
