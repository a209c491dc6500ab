//! Redis cache backend
//!
//! Uses a `ConnectionManager`, which reconnects on its own and multiplexes
//! concurrent callers over one connection.

use std::fmt;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{BackendResult, CacheBackend};
use crate::error::CacheBackendError;

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 500;

pub struct RedisBackend {
    conn: RwLock<Option<ConnectionManager>>,
    redis_url: String,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("redis_url", &self.redis_url)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Opens the connection eagerly; the caller decides what to do if
    /// Redis is unreachable at startup.
    pub async fn connect(redis_url: &str) -> BackendResult<Self> {
        info!("Connecting to Redis at {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            conn: RwLock::new(Some(manager)),
            redis_url: redis_url.to_string(),
        })
    }

    async fn connection(&self) -> BackendResult<ConnectionManager> {
        self.conn.read().await.clone().ok_or(CacheBackendError::Closed)
    }

    async fn scan_keys(
        &self,
        conn: &mut ConnectionManager,
        pattern: &str,
    ) -> BackendResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> BackendResult<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.del::<_, u64>(key).await?)
    }

    async fn delete_matching(&self, pattern: &str) -> BackendResult<u64> {
        let mut conn = self.connection().await?;
        let keys = self.scan_keys(&mut conn, pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        debug!("Deleting {} keys matching {}", keys.len(), pattern);
        // one DEL so the family disappears in a single command
        Ok(conn.del::<_, u64>(&keys).await?)
    }

    async fn flush(&self) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Redis connection released");
        }
    }
}
