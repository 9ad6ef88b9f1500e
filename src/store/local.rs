use crate::db::migrate::run_local_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::Local;
use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Named keys of the on-device store.
pub mod keys {
    pub const SHIFTS: &str = "shifts";
    pub const SETTINGS: &str = "settings";
    pub const STATUS: &str = "status";
    pub const CURRENT_CLOCK_IN: &str = "current_clock_in";
    pub const CURRENT_BREAKS: &str = "current_breaks";
    pub const AUTH_SESSION: &str = "auth_session";
}

/// Durable key-value storage on the device. Values are JSON documents.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize + ?Sized + Sync>(
    store: &dyn LocalStore,
    key: &str,
    value: &T,
) -> AppResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

fn local_err(e: rusqlite::Error) -> AppError {
    AppError::LocalStore(e.to_string())
}

/// `LocalStore` over the `kv` table of a SQLite file.
pub struct SqliteLocalStore {
    pool: DbPool,
}

impl SqliteLocalStore {
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        pool.with_conn(|conn| run_local_migrations(conn))?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        pool.with_conn(|conn| run_local_migrations(conn))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.pool
            .with_conn(|conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                    row.get::<_, String>(0)
                })
                .optional()
            })
            .map_err(local_err)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let now = Local::now().to_rfc3339();
        self.pool
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    params![key, value, now],
                )
            })
            .map_err(local_err)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.pool
            .with_conn(|conn| conn.execute("DELETE FROM kv WHERE key = ?1", [key]))
            .map_err(local_err)?;
        Ok(())
    }
}
