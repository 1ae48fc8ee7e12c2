//! SQLite-backed data store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use super::{DataStore, StoreError};

/// SQLite-backed key → JSON store.
pub struct SqliteDataStore {
    conn: Mutex<Connection>,
}

impl SqliteDataStore {
    /// Open (or create) the database file and its table.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS plugin_data (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection mutex poisoned".to_string()))
    }
}

impl DataStore for SqliteDataStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM plugin_data WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO plugin_data (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value.to_string(), Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM plugin_data WHERE key = ?", params![key])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(removed > 0)
    }
}
