//! Item Service
//!
//! Orchestrates identifier assignment, store access and the cache:
//! reads go through the cache, writes hit the store and then delete the
//! affected cache keys so the next read repopulates them.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{item_key, CacheClient, ALL_ITEMS_KEY, ITEMS_PATTERN};
use crate::error::{Result, ServiceError, StoreError};
use crate::models::{
    parse_item_id, DeleteResponse, HealthResponse, Item, ItemCreate, ItemList, ItemUpdate,
};
use crate::store::ItemStore;

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    cache: CacheClient,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, cache: CacheClient) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &CacheClient {
        &self.cache
    }

    // == Read Path ==

    pub async fn list_items(&self) -> Result<ItemList> {
        if let Some(list) = self.cached::<ItemList>(ALL_ITEMS_KEY).await {
            return Ok(list);
        }

        let list = ItemList::new(self.store.list().await?);
        self.populate(ALL_ITEMS_KEY, &list).await;
        Ok(list)
    }

    pub async fn get_item(&self, raw_id: &str) -> Result<Item> {
        let id = parse_item_id(raw_id)?;
        let key = item_key(&id);

        if let Some(item) = self.cached::<Item>(&key).await {
            return Ok(item);
        }

        let item = self.find(id).await?;
        self.populate(&key, &item).await;
        Ok(item)
    }

    // == Write Path ==

    pub async fn create_item(&self, payload: ItemCreate) -> Result<Item> {
        if let Some(msg) = payload.validate() {
            return Err(ServiceError::InvalidInput(msg));
        }

        let id = match payload.id.as_deref() {
            Some(raw) => {
                let id = parse_item_id(raw)?;
                if self.store.get(id).await?.is_some() {
                    return Err(ServiceError::AlreadyExists(id.to_string()));
                }
                id
            }
            // v4 collisions are negligible, so no lookup here
            None => Uuid::new_v4(),
        };

        let item = Item {
            id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            in_stock: payload.in_stock.unwrap_or(true),
        };

        self.store.insert(&item).await.map_err(|e| match e {
            StoreError::Conflict(id) => ServiceError::AlreadyExists(id),
            other => ServiceError::Store(other),
        })?;
        info!("Created item {}", item.id);

        self.cache.delete(ALL_ITEMS_KEY).await;
        Ok(item)
    }

    pub async fn update_item(&self, raw_id: &str, payload: ItemUpdate) -> Result<Item> {
        let id = parse_item_id(raw_id)?;
        if let Some(msg) = payload.validate() {
            return Err(ServiceError::InvalidInput(msg));
        }

        let existing = self.find(id).await?;
        let item = Item {
            id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            in_stock: payload.in_stock.unwrap_or(existing.in_stock),
        };

        // row may have been deleted between the lookup and the write
        if !self.store.update(&item).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        info!("Updated item {}", id);

        self.invalidate(&id).await;
        Ok(item)
    }

    pub async fn delete_item(&self, raw_id: &str) -> Result<DeleteResponse> {
        let id = parse_item_id(raw_id)?;
        self.find(id).await?;

        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        info!("Deleted item {}", id);

        self.invalidate(&id).await;
        Ok(DeleteResponse::new(id))
    }

    // == Maintenance ==

    /// Drops every cached item and the collection in one pass.
    pub async fn invalidate_all(&self) -> bool {
        self.cache.delete_matching(ITEMS_PATTERN).await
    }

    /// Probes the store and cache. Never fails; a store outage is reported
    /// as a degraded status.
    pub async fn health(&self) -> HealthResponse {
        let store = self.store.ping().await.map_err(|e| {
            warn!("Health check: store unreachable: {}", e);
            e.to_string()
        });
        let cache = self.cache.status().await;
        HealthResponse::from_probes(store, cache.as_str())
    }

    // == Helpers ==

    async fn find(&self, id: Uuid) -> Result<Item> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    async fn invalidate(&self, id: &Uuid) {
        self.cache.delete(&item_key(id)).await;
        self.cache.delete(ALL_ITEMS_KEY).await;
    }

    /// Cached value for `key`, if present and decodable.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.cache.get(key).await.into_hit()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                self.cache.set(key, &json, self.cache.default_ttl()).await;
            }
            Err(e) => warn!("Could not serialize cache entry {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::cache::{BackendResult, CacheBackend, CacheLookup, MemoryBackend};
    use crate::store::{SqliteItemStore, StoreResult};

    // == Test Doubles ==

    /// Counts every store call before delegating to SQLite.
    struct CountingStore {
        inner: SqliteItemStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: SqliteItemStore::open_in_memory().unwrap(),
                calls: AtomicUsize::new(0),
            }
        }

        fn bump(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemStore for CountingStore {
        async fn list(&self) -> StoreResult<Vec<Item>> {
            self.bump();
            self.inner.list().await
        }
        async fn get(&self, id: Uuid) -> StoreResult<Option<Item>> {
            self.bump();
            self.inner.get(id).await
        }
        async fn insert(&self, item: &Item) -> StoreResult<()> {
            self.bump();
            self.inner.insert(item).await
        }
        async fn update(&self, item: &Item) -> StoreResult<bool> {
            self.bump();
            self.inner.update(item).await
        }
        async fn delete(&self, id: Uuid) -> StoreResult<bool> {
            self.bump();
            self.inner.delete(id).await
        }
        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    /// Counts every backend call before delegating to memory.
    struct CountingBackend {
        inner: MemoryBackend,
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(100),
                calls: AtomicUsize::new(0),
            }
        }

        fn bump(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CacheBackend for CountingBackend {
        fn name(&self) -> &'static str {
            "counting"
        }
        async fn get(&self, key: &str) -> BackendResult<Option<String>> {
            self.bump();
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> BackendResult<()> {
            self.bump();
            self.inner.set(key, value, ttl_secs).await
        }
        async fn delete(&self, key: &str) -> BackendResult<u64> {
            self.bump();
            self.inner.delete(key).await
        }
        async fn delete_matching(&self, pattern: &str) -> BackendResult<u64> {
            self.bump();
            self.inner.delete_matching(pattern).await
        }
        async fn flush(&self) -> BackendResult<()> {
            self.inner.flush().await
        }
        async fn ping(&self) -> BackendResult<()> {
            self.inner.ping().await
        }
        async fn shutdown(&self) {
            self.inner.shutdown().await
        }
    }

    /// Store whose every call fails, for health and 500 paths.
    struct BrokenStore;

    #[async_trait]
    impl ItemStore for BrokenStore {
        async fn list(&self) -> StoreResult<Vec<Item>> {
            Err(StoreError::Task("database is gone".into()))
        }
        async fn get(&self, _id: Uuid) -> StoreResult<Option<Item>> {
            Err(StoreError::Task("database is gone".into()))
        }
        async fn insert(&self, _item: &Item) -> StoreResult<()> {
            Err(StoreError::Task("database is gone".into()))
        }
        async fn update(&self, _item: &Item) -> StoreResult<bool> {
            Err(StoreError::Task("database is gone".into()))
        }
        async fn delete(&self, _id: Uuid) -> StoreResult<bool> {
            Err(StoreError::Task("database is gone".into()))
        }
        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Task("database is gone".into()))
        }
    }

    struct Fixture {
        service: ItemService,
        store: Arc<CountingStore>,
        backend: Arc<CountingBackend>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(CountingStore::new());
        let backend = Arc::new(CountingBackend::new());
        let cache = CacheClient::new(backend.clone(), 300);
        Fixture {
            service: ItemService::new(store.clone(), cache),
            store,
            backend,
        }
    }

    fn widget() -> ItemCreate {
        ItemCreate {
            id: None,
            name: "Widget".to_string(),
            description: Some("blue".to_string()),
            price: 9.99,
            in_stock: None,
        }
    }

    fn update(name: &str, in_stock: Option<bool>) -> ItemUpdate {
        ItemUpdate {
            name: name.to_string(),
            description: None,
            price: 19.5,
            in_stock,
        }
    }

    // == Read Path ==

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let f = fixture();
        let created = f.service.create_item(widget()).await.unwrap();
        assert!(created.in_stock);

        let fetched = f.service.get_item(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_populates_cache_and_skips_store_on_hit() {
        let f = fixture();
        let created = f.service.create_item(widget()).await.unwrap();
        let id = created.id.to_string();

        f.service.get_item(&id).await.unwrap();
        let store_calls = f.store.calls();
        assert!(f.service.cache().get(&item_key(&created.id)).await.into_hit().is_some());

        assert_eq!(f.service.get_item(&id).await.unwrap(), created);
        assert_eq!(f.store.calls(), store_calls);
    }

    #[tokio::test]
    async fn test_list_served_from_cache_after_first_read() {
        let f = fixture();
        f.service.create_item(widget()).await.unwrap();

        let first = f.service.list_items().await.unwrap();
        let store_calls = f.store.calls();
        let second = f.service.list_items().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.count, 1);
        assert_eq!(f.store.calls(), store_calls);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_falls_back_to_store() {
        let f = fixture();
        f.service.create_item(widget()).await.unwrap();
        f.service.cache().set(ALL_ITEMS_KEY, "not json", 300).await;

        let list = f.service.list_items().await.unwrap();
        assert_eq!(list.count, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_id_not_found() {
        let f = fixture();
        let err = f
            .service
            .get_item(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_id_touches_nothing() {
        let f = fixture();
        for raw in ["42", "not-a-uuid", "", "0b6f5a528f6e4bd29f3e2c3a2f1e4d5c"] {
            assert!(matches!(
                f.service.get_item(raw).await,
                Err(ServiceError::InvalidInput(_))
            ));
            assert!(matches!(
                f.service.update_item(raw, update("x", None)).await,
                Err(ServiceError::InvalidInput(_))
            ));
            assert!(matches!(
                f.service.delete_item(raw).await,
                Err(ServiceError::InvalidInput(_))
            ));
            let mut payload = widget();
            payload.id = Some(raw.to_string());
            assert!(matches!(
                f.service.create_item(payload).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }

        assert_eq!(f.store.calls(), 0);
        assert_eq!(f.backend.calls.load(Ordering::SeqCst), 0);
    }

    // == Write Path ==

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let f = fixture();
        let id = Uuid::new_v4();
        let mut payload = widget();
        payload.id = Some(id.to_string().to_uppercase());

        let created = f.service.create_item(payload).await.unwrap();
        assert_eq!(created.id, id);
    }

    #[tokio::test]
    async fn test_create_duplicate_id_leaves_store_unchanged() {
        let f = fixture();
        let first = f.service.create_item(widget()).await.unwrap();

        let mut payload = widget();
        payload.id = Some(first.id.to_string());
        payload.name = "Impostor".to_string();
        let err = f.service.create_item(payload).await.unwrap_err();

        assert!(matches!(err, ServiceError::AlreadyExists(_)));
        let list = f.service.list_items().await.unwrap();
        assert_eq!(list.items, vec![first]);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let f = fixture();
        let mut payload = widget();
        payload.name = String::new();
        assert!(matches!(
            f.service.create_item(payload).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_create_invalidates_collection() {
        let f = fixture();
        assert_eq!(f.service.list_items().await.unwrap().count, 0);

        f.service.create_item(widget()).await.unwrap();
        assert_eq!(
            f.service.cache().get(ALL_ITEMS_KEY).await,
            CacheLookup::Miss
        );
        assert_eq!(f.service.list_items().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_and_keeps_in_stock_when_absent() {
        let f = fixture();
        let mut payload = widget();
        payload.in_stock = Some(false);
        let created = f.service.create_item(payload).await.unwrap();
        let id = created.id.to_string();

        let updated = f.service.update_item(&id, update("Gadget", None)).await.unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.description, None);
        assert_eq!(updated.price, 19.5);
        assert!(!updated.in_stock);

        let updated = f
            .service
            .update_item(&id, update("Gadget", Some(true)))
            .await
            .unwrap();
        assert!(updated.in_stock);
        assert_eq!(f.service.get_item(&id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_invalidates_item_and_collection() {
        let f = fixture();
        let created = f.service.create_item(widget()).await.unwrap();
        let id = created.id.to_string();

        f.service.get_item(&id).await.unwrap();
        f.service.list_items().await.unwrap();

        f.service.update_item(&id, update("Gadget", None)).await.unwrap();
        assert_eq!(f.service.cache().get(&item_key(&created.id)).await, CacheLookup::Miss);
        assert_eq!(f.service.cache().get(ALL_ITEMS_KEY).await, CacheLookup::Miss);

        assert_eq!(f.service.get_item(&id).await.unwrap().name, "Gadget");
        assert_eq!(f.service.list_items().await.unwrap().items[0].name, "Gadget");
    }

    #[tokio::test]
    async fn test_update_unknown_not_found() {
        let f = fixture();
        let err = f
            .service
            .update_item(&Uuid::new_v4().to_string(), update("x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let f = fixture();
        let created = f.service.create_item(widget()).await.unwrap();
        let id = created.id.to_string();

        f.service.get_item(&id).await.unwrap();
        f.service.list_items().await.unwrap();

        let resp = f.service.delete_item(&id).await.unwrap();
        assert_eq!(resp.id, created.id);

        assert!(matches!(
            f.service.get_item(&id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(f.service.list_items().await.unwrap().items.is_empty());
        assert!(matches!(
            f.service.delete_item(&id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cache_outage_does_not_fail_requests() {
        let f = fixture();
        f.service.cache().shutdown().await;

        let created = f.service.create_item(widget()).await.unwrap();
        let id = created.id.to_string();
        assert_eq!(f.service.get_item(&id).await.unwrap(), created);
        assert_eq!(f.service.list_items().await.unwrap().count, 1);
        f.service.delete_item(&id).await.unwrap();

        assert!(f.service.cache().stats().unavailable > 0);
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let f = fixture();
        let created = f.service.create_item(widget()).await.unwrap();
        f.service.get_item(&created.id.to_string()).await.unwrap();
        f.service.list_items().await.unwrap();

        assert!(f.service.invalidate_all().await);
        assert_eq!(f.service.cache().get(ALL_ITEMS_KEY).await, CacheLookup::Miss);
        assert_eq!(f.service.cache().get(&item_key(&created.id)).await, CacheLookup::Miss);
    }

    // == Health ==

    #[tokio::test]
    async fn test_health_reports_degraded_store() {
        let service = ItemService::new(Arc::new(BrokenStore), CacheClient::disabled());
        let health = service.health().await;
        assert_eq!(health.status, "degraded");
        assert_eq!(health.database, "disconnected");
        assert_eq!(health.cache, "disabled");
        assert!(health.database_error.unwrap().contains("database is gone"));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = ItemService::new(Arc::new(BrokenStore), CacheClient::disabled());
        assert!(matches!(
            service.list_items().await,
            Err(ServiceError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let f = fixture();
        let health = f.service.health().await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.cache, "connected");
    }
}
