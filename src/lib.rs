//! Items Service - item CRUD over SQLite with a read-through cache
//!
//! Reads are served from the cache when possible; writes go to the store
//! and invalidate the affected cache keys.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::ItemService;
pub use tasks::spawn_cleanup_task;
