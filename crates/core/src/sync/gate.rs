//! Dedup gate: the persisted map of synced keys.
//!
//! A key is `<external_id>_<season>` and its value is either the Notion page
//! id or [`PENDING`] while a create is in flight. Callers hold the service
//! mutex around every read-modify-write.

use std::collections::HashMap;
use std::sync::Arc;

use crate::media::MediaRecord;
use crate::store::{load, save, DataStore, StoreError};

/// Store key of the synced-key map.
pub const SYNCED_KEYS_KEY: &str = "synced_keys";

/// Value of a key whose page is being created.
pub const PENDING: &str = "pending";

/// Dedup key for a record, `None` when it has no external id.
pub fn dedup_key(record: &MediaRecord) -> Option<String> {
    let external_id = record.external_id.as_deref()?.trim();
    if external_id.is_empty() {
        return None;
    }
    let season = record.season_number().unwrap_or(0);
    Some(format!("{}_{}", external_id, season))
}

/// Typed access to the synced-key map.
#[derive(Clone)]
pub struct SyncedKeys {
    store: Arc<dyn DataStore>,
}

impl SyncedKeys {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn all(&self) -> Result<HashMap<String, String>, StoreError> {
        Ok(load(self.store.as_ref(), SYNCED_KEYS_KEY)?.unwrap_or_default())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut keys = self.all()?;
        keys.insert(key.to_string(), value.to_string());
        save(self.store.as_ref(), SYNCED_KEYS_KEY, &keys)
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let mut keys = self.all()?;
        let existed = keys.remove(key).is_some();
        if existed {
            save(self.store.as_ref(), SYNCED_KEYS_KEY, &keys)?;
        }
        Ok(existed)
    }

    /// Drop every key. Returns how many there were.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let count = self.all()?.len();
        save(self.store.as_ref(), SYNCED_KEYS_KEY, &HashMap::<String, String>::new())?;
        Ok(count)
    }
}
