//! In-process cache backend
//!
//! HashMap storage with per-entry TTL and LRU eviction at capacity. Used for
//! single-node runs and tests; behaves like the Redis backend from the
//! client's point of view.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{glob_match, BackendResult, CacheBackend, CacheEntry, LruTracker};
use crate::error::CacheBackendError;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
}

impl MemoryState {
    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }
}

// == Memory Backend ==
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    max_entries: usize,
    closed: AtomicBool,
}

impl MemoryBackend {
    /// Creates an empty backend holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            max_entries: max_entries.max(1),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> BackendResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(CacheBackendError::Closed)
        } else {
            Ok(())
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        expired.len()
    }

    /// Number of stored entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        self.ensure_open()?;
        let mut state = self.state.write().await;

        let value = match state.entries.get(key) {
            Some(entry) if entry.is_expired() => None,
            Some(entry) => Some(entry.value.clone()),
            None => return Ok(None),
        };

        match value {
            Some(v) => {
                state.lru.touch(key);
                Ok(Some(v))
            }
            None => {
                state.remove(key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> BackendResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write().await;

        if !state.entries.contains_key(key) && state.entries.len() >= self.max_entries {
            if let Some(evicted) = state.lru.evict_oldest() {
                state.entries.remove(&evicted);
            }
        }

        state
            .entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl_secs));
        state.lru.touch(key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<u64> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        Ok(u64::from(state.remove(key)))
    }

    async fn delete_matching(&self, pattern: &str) -> BackendResult<u64> {
        self.ensure_open()?;
        // match and remove under one lock so readers never see half a family
        let mut state = self.state.write().await;
        let matched: Vec<String> = state
            .entries
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect();

        for key in &matched {
            state.remove(key);
        }
        Ok(matched.len() as u64)
    }

    async fn flush(&self) -> BackendResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write().await;
        state.entries.clear();
        state.lru.clear();
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        self.ensure_open()
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        let mut state = self.state.write().await;
        state.entries.clear();
        state.lru.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryBackend::new(10);
        backend.set("k", "v", 60).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let backend = MemoryBackend::new(10);
        backend.set("k", "v", 0).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let backend = MemoryBackend::new(2);
        backend.set("a", "1", 60).await.unwrap();
        backend.set("b", "2", 60).await.unwrap();
        backend.get("a").await.unwrap();
        backend.set("c", "3", 60).await.unwrap();

        assert_eq!(backend.len().await, 2);
        assert!(backend.get("a").await.unwrap().is_some());
        assert!(backend.get("b").await.unwrap().is_none());
        assert!(backend.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_counts() {
        let backend = MemoryBackend::new(10);
        backend.set("k", "v", 60).await.unwrap();
        assert_eq!(backend.delete("k").await.unwrap(), 1);
        assert_eq!(backend.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_matching_only_touches_family() {
        let backend = MemoryBackend::new(10);
        backend.set("items:all", "[]", 60).await.unwrap();
        backend.set("items:1", "{}", 60).await.unwrap();
        backend.set("users:1", "{}", 60).await.unwrap();

        assert_eq!(backend.delete_matching("items:*").await.unwrap(), 2);
        assert!(backend.get("users:1").await.unwrap().is_some());
        assert!(backend.get("items:all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let backend = MemoryBackend::new(10);
        backend.set("short", "v", 0).await.unwrap();
        backend.set("long", "v", 600).await.unwrap();

        assert_eq!(backend.cleanup_expired().await, 1);
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_shutdown_closes_backend() {
        let backend = MemoryBackend::new(10);
        backend.set("k", "v", 60).await.unwrap();
        backend.shutdown().await;

        assert!(matches!(backend.get("k").await, Err(CacheBackendError::Closed)));
        assert!(matches!(backend.ping().await, Err(CacheBackendError::Closed)));
    }
}
