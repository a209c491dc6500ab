//! LRU Tracker Module
//!
//! Orders memory-backend keys by last access so the coldest can be evicted.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Each touch stamps a key with a monotonically increasing tick; the
/// smallest tick is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    ticks: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
    clock: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        if let Some(old) = self.ticks.insert(key.to_string(), self.clock) {
            self.order.remove(&old);
        }
        self.order.insert(self.clock, key.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.order.remove(&tick);
        }
    }

    /// Removes and returns the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
