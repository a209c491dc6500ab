//! Response DTOs for the items API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Item;
use crate::cache::CacheStats;

/// Response body for GET /items, also the shape cached under `items:all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<Item>,
    pub count: usize,
}

impl ItemList {
    /// Creates a new ItemList
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Response body for DELETE /items/{id}
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The identifier that was deleted
    pub id: Uuid,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: Uuid) -> Self {
        Self {
            message: format!("Item '{}' deleted successfully", id),
            id,
        }
    }
}

/// Response body for the health endpoint (GET /health)
///
/// Always served with 200; a store outage shows up as `degraded`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// API status, always "ok" while the server answers
    pub api: String,
    /// "connected" or "disconnected"
    pub database: String,
    /// Store error captured during the check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    /// "connected", "disconnected" or "disabled"
    pub cache: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Builds a HealthResponse from probe results.
    pub fn from_probes(store: Result<(), String>, cache: &str) -> Self {
        let (status, database, database_error) = match store {
            Ok(()) => ("healthy", "connected", None),
            Err(e) => ("degraded", "disconnected", Some(e)),
        };
        Self {
            status: status.to_string(),
            api: "ok".to_string(),
            database: database.to_string(),
            database_error,
            cache: cache.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub enabled: bool,
    pub hits: u64,
    pub misses: u64,
    pub unavailable: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub invalidations: u64,
    /// Hit rate (hits / all lookups)
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    /// Creates a new CacheStatsResponse from cache statistics
    pub fn new(enabled: bool, stats: &CacheStats) -> Self {
        Self {
            enabled,
            hits: stats.hits,
            misses: stats.misses,
            unavailable: stats.unavailable,
            writes: stats.writes,
            write_failures: stats.write_failures,
            invalidations: stats.invalidations,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub flushed: bool,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
