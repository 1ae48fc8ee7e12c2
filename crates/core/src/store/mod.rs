//! Persisted plugin data: a small key → JSON document store.
//!
//! Holds the sync history and the synced-key map. Mirrors the key-value
//! storage media managers hand to their plugins.

mod sqlite;

pub use sqlite::SqliteDataStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from the data store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error for key '{key}': {message}")]
    Serialization { key: String, message: String },
}

/// Key → JSON document storage.
pub trait DataStore: Send + Sync {
    /// Read the document stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous document.
    fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Typed read. A document that no longer matches `T` is an error.
pub fn load<T: DeserializeOwned>(store: &dyn DataStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Typed write.
pub fn save<T: Serialize>(store: &dyn DataStore, key: &str, value: &T) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &value)
}
