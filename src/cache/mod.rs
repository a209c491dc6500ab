//! Cache Module
//!
//! Soft-failing cache client over pluggable key-value backends.

mod client;
mod entry;
mod glob;
mod lru;
mod memory;
mod redis_backend;
mod stats;


use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CacheBackendError;

// Re-export public types
pub use client::{CacheClient, CacheLookup, CacheStatus};
pub use entry::CacheEntry;
pub use glob::glob_match;
pub use lru::LruTracker;
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use stats::{CacheCounters, CacheStats};

// == Key Families ==
/// Key holding the serialized item collection.
pub const ALL_ITEMS_KEY: &str = "items:all";

/// Pattern covering every item key, collection included.
pub const ITEMS_PATTERN: &str = "items:*";

/// Key holding a single serialized item.
pub fn item_key(id: &Uuid) -> String {
    format!("items:{}", id)
}

/// Result type used by backends.
pub type BackendResult<T> = std::result::Result<T, CacheBackendError>;

// == Backend Trait ==
/// A key-value store the cache client can sit on.
///
/// Implementations must tolerate concurrent callers without external locking.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl_secs`.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> BackendResult<()>;

    /// Returns the number of keys removed.
    async fn delete(&self, key: &str) -> BackendResult<u64>;

    /// Removes every key matching a glob pattern, returning the count.
    async fn delete_matching(&self, pattern: &str) -> BackendResult<u64>;

    /// Drops every key in the namespace.
    async fn flush(&self) -> BackendResult<()>;

    async fn ping(&self) -> BackendResult<()>;

    /// Releases the connection. Later calls fail with `Closed`.
    async fn shutdown(&self);
}
