//! SQLite item store
//!
//! One `items` table. The connection sits behind a mutex and every
//! statement runs on the blocking pool so request tasks never stall the
//! runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ItemStore, StoreResult};
use crate::error::StoreError;
use crate::models::Item;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS items (
    id          TEXT PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    price       REAL NOT NULL,
    in_stock    INTEGER NOT NULL DEFAULT 1
);
";

const SELECT_COLUMNS: &str = "SELECT id, name, description, price, in_stock FROM items";

#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteItemStore {
    /// Opens (or creates) the database at `path`; `:memory:` gives a
    /// private in-memory database.
    pub fn open(path: &str) -> StoreResult<Self> {
        if path == ":memory:" {
            return Self::open_in_memory();
        }
        info!("Opening SQLite database at {:?}", Path::new(path));
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_schema(conn)
    }

    /// Opens an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        debug!("Opening in-memory SQLite database");
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("Lock poisoned: {}", e)))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<(String, Item)> {
    let raw_id: String = row.get(0)?;
    Ok((
        raw_id,
        Item {
            id: Uuid::nil(),
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            in_stock: row.get(4)?,
        },
    ))
}

fn finish_item((raw_id, mut item): (String, Item)) -> StoreResult<Item> {
    item.id = Uuid::try_parse(&raw_id)
        .map_err(|_| StoreError::Corrupt(format!("invalid id '{}'", raw_id)))?;
    Ok(item)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn list(&self) -> StoreResult<Vec<Item>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(&format!("{} ORDER BY name, id", SELECT_COLUMNS))?;
            let rows = stmt.query_map([], row_to_item)?;
            let items = rows
                .map(|row| finish_item(row?))
                .collect::<StoreResult<Vec<Item>>>();
            items
        })
        .await
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Item>> {
        self.run(move |conn| {
            let row = conn
                .query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    params![id.to_string()],
                    row_to_item,
                )
                .optional()?;
            row.map(finish_item).transpose()
        })
        .await
    }

    async fn insert(&self, item: &Item) -> StoreResult<()> {
        let item = item.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO items (id, name, description, price, in_stock) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.id.to_string(),
                    item.name,
                    item.description,
                    item.price,
                    item.in_stock
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(item.id.to_string())
                } else {
                    StoreError::Database(e)
                }
            })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, item: &Item) -> StoreResult<bool> {
        let item = item.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE items SET name = ?2, description = ?3, price = ?4, in_stock = ?5 \
                 WHERE id = ?1",
                params![
                    item.id.to_string(),
                    item.name,
                    item.description,
                    item.price,
                    item.in_stock
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        self.run(move |conn| {
            let changed = conn.execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])?;
            Ok(changed > 0)
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.run(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
