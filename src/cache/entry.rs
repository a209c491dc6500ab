//! Cache Entry Module
//!
//! A single value held by the memory backend, with its expiry deadline.

use std::time::{Duration, Instant};

// == Cache Entry ==
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Instant after which the entry counts as absent
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Creates an entry expiring `ttl_secs` from now.
    pub fn new(value: String, ttl_secs: u64) -> Self {
        Self {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        }
    }

    /// An entry is expired once the deadline has been reached.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
