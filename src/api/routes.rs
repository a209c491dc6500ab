//! API Routes
//!
//! Configures the Axum router with all items endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, create_item_handler, delete_item_handler, flush_cache_handler,
    get_item_handler, health_handler, invalidate_items_handler, list_items_handler,
    update_item_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/items/:id",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        )
        .route("/health", get(health_handler))
        .route("/cache", delete(flush_cache_handler))
        .route("/cache/items", delete(invalidate_items_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
