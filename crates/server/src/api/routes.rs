use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{admin, events, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes behind the shared secret
    let protected = Router::new()
        .route("/ops", get(handlers::list_ops))
        .route("/config", get(handlers::get_config))
        // Media manager events
        .route("/events/transfer-complete", post(events::transfer_complete))
        // History and dedup cache
        .route("/history", get(admin::list_history))
        .route("/history/{key}", delete(admin::delete_history))
        .route("/cache/clear", post(admin::clear_cache))
        // Notion
        .route("/test-connection", get(admin::test_connection))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
