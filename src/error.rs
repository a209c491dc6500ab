//! Error types for the items service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failures raised by the relational item store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Unique constraint violated on insert
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Blocking task panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(String),

    /// Row could not be mapped back into an item
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

// == Cache Backend Error Enum ==
/// Failures raised by a cache backend. Never leaves the cache client.
#[derive(Error, Debug)]
pub enum CacheBackendError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend was shut down
    #[error("Cache connection closed")]
    Closed,
}

// == Service Error Enum ==
/// Unified error type returned by the item service and its handlers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed identifier or payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Identifier already taken on create
    #[error("Item already exists: {0}")]
    AlreadyExists(String),

    /// No item with the identifier
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::InvalidInput(_) | ServiceError::AlreadyExists(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServiceError::Store(err) => {
                error!("Store failure while serving request: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the items service.
pub type Result<T> = std::result::Result<T, ServiceError>;
