//! API Handlers
//!
//! HTTP request handlers for each items endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::{Result, ServiceError};
use crate::models::{
    parse_item_id, CacheStatsResponse, DeleteResponse, FlushResponse, HealthResponse, Item,
    ItemCreate, ItemList, ItemUpdate,
};
use crate::service::ItemService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ItemService,
}

impl AppState {
    pub fn new(service: ItemService) -> Self {
        Self { service }
    }
}

/// Unwraps a JSON body, turning axum's rejection into a 400.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServiceError::InvalidInput(rejection.body_text()))
}

/// Handler for GET /items
pub async fn list_items_handler(State(state): State<AppState>) -> Result<Json<ItemList>> {
    Ok(Json(state.service.list_items().await?))
}

/// Handler for GET /items/:id
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>> {
    Ok(Json(state.service.get_item(&id).await?))
}

/// Handler for POST /items
pub async fn create_item_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ItemCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state.service.create_item(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for PUT /items/:id
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ItemUpdate>, JsonRejection>,
) -> Result<Json<Item>> {
    // a malformed id wins over a malformed body
    let payload = json_body(payload);
    parse_item_id(&id)?;
    Ok(Json(state.service.update_item(&id, payload?).await?))
}

/// Handler for DELETE /items/:id
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    Ok(Json(state.service.delete_item(&id).await?))
}

/// Handler for GET /health
///
/// Always 200; store trouble is reported in the body.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.service.health().await)
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = state.service.cache();
    Json(CacheStatsResponse::new(cache.is_enabled(), &cache.stats()))
}

/// Handler for DELETE /cache
pub async fn flush_cache_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        flushed: state.service.cache().clear_all().await,
    })
}

/// Handler for DELETE /cache/items
pub async fn invalidate_items_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        flushed: state.service.invalidate_all().await,
    })
}
