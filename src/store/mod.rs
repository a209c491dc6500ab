//! Item Store Module
//!
//! Relational persistence of items behind the `ItemStore` trait.

mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Item;

pub use sqlite::SqliteItemStore;

/// Result type used by stores.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Single-table CRUD over items. Each call is one atomic statement.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, ordered by name then id.
    async fn list(&self) -> StoreResult<Vec<Item>>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>>;

    /// Inserts a new row. A duplicate id yields `StoreError::Conflict`.
    async fn insert(&self, item: &Item) -> StoreResult<()>;

    /// Overwrites every column but the id. Returns false if no row matched.
    async fn update(&self, item: &Item) -> StoreResult<bool>;

    /// Returns false if no row matched.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> StoreResult<()>;
}
