//! Cache Client
//!
//! Soft-failing front for a `CacheBackend`. Backend errors are logged and
//! counted here and never reach the caller as errors.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{CacheBackend, CacheCounters, CacheStats};

// == Cache Lookup ==
/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(String),
    Miss,
    /// The backend failed; callers treat this like a miss.
    Unavailable,
}

impl CacheLookup {
    /// Collapses `Miss` and `Unavailable`.
    pub fn into_hit(self) -> Option<String> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::Unavailable => None,
        }
    }
}

/// Reachability of the cache as reported by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Connected,
    Disconnected,
    Disabled,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Connected => "connected",
            CacheStatus::Disconnected => "disconnected",
            CacheStatus::Disabled => "disabled",
        }
    }
}

// == Cache Client ==
/// Cloneable handle shared by every request.
#[derive(Clone)]
pub struct CacheClient {
    backend: Option<Arc<dyn CacheBackend>>,
    default_ttl: u64,
    counters: Arc<CacheCounters>,
}

impl std::fmt::Debug for CacheClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheClient")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CacheClient {
    /// Creates a client over `backend` with a default TTL in seconds.
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: u64) -> Self {
        Self {
            backend: Some(backend),
            default_ttl,
            counters: Arc::new(CacheCounters::new()),
        }
    }

    /// A client with no backend: every read misses, every write is a no-op.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            default_ttl: 0,
            counters: Arc::new(CacheCounters::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Get ==
    pub async fn get(&self, key: &str) -> CacheLookup {
        let Some(backend) = &self.backend else {
            return CacheLookup::Miss;
        };

        match backend.get(key).await {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", key);
                self.counters.record_hit();
                CacheLookup::Hit(value)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", key);
                self.counters.record_miss();
                CacheLookup::Miss
            }
            Err(e) => {
                warn!("Cache get error for key {}: {}", key, e);
                self.counters.record_unavailable();
                CacheLookup::Unavailable
            }
        }
    }

    // == Set ==
    /// Stores `value` for `ttl_secs` (clamped to at least one second).
    /// Returns whether the write landed.
    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match backend.set(key, value, ttl_secs.max(1)).await {
            Ok(()) => {
                self.counters.record_write();
                true
            }
            Err(e) => {
                warn!("Cache set error for key {}: {}", key, e);
                self.counters.record_write_failure();
                false
            }
        }
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match backend.delete(key).await {
            Ok(_) => {
                self.counters.record_invalidation();
                true
            }
            Err(e) => {
                warn!("Cache delete error for key {}: {}", key, e);
                self.counters.record_write_failure();
                false
            }
        }
    }

    // == Delete Matching ==
    /// Removes every key matching a glob pattern.
    pub async fn delete_matching(&self, pattern: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match backend.delete_matching(pattern).await {
            Ok(count) => {
                debug!("Invalidated {} keys matching {}", count, pattern);
                self.counters.record_invalidation();
                true
            }
            Err(e) => {
                warn!("Cache delete pattern error for {}: {}", pattern, e);
                self.counters.record_write_failure();
                false
            }
        }
    }

    // == Clear All ==
    /// Flushes the whole namespace. Administrative resets only.
    pub async fn clear_all(&self) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match backend.flush().await {
            Ok(()) => {
                self.counters.record_invalidation();
                true
            }
            Err(e) => {
                warn!("Cache clear error: {}", e);
                self.counters.record_write_failure();
                false
            }
        }
    }

    pub async fn status(&self) -> CacheStatus {
        match &self.backend {
            None => CacheStatus::Disabled,
            Some(backend) => match backend.ping().await {
                Ok(()) => CacheStatus::Connected,
                Err(e) => {
                    warn!("Cache ping failed: {}", e);
                    CacheStatus::Disconnected
                }
            },
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Releases the backend connection. Call after the server has drained.
    pub async fn shutdown(&self) {
        if let Some(backend) = &self.backend {
            backend.shutdown().await;
        }
    }
}
