//! Sync history: the last [`HISTORY_LIMIT`] sync attempts.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::media::MediaRecord;
use crate::store::{load, save, DataStore, StoreError};

/// Store key of the history list.
pub const HISTORY_KEY: &str = "history";

/// Entries kept; older ones are evicted first.
pub const HISTORY_LIMIT: usize = 100;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    Skipped,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Skipped => "skipped",
            SyncStatus::Failed => "failed",
        }
    }

    /// Label shown in the manager's UI.
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Success => "成功",
            SyncStatus::Skipped => "跳过",
            SyncStatus::Failed => "失败",
        }
    }

    /// Chip color in the manager's UI.
    pub fn color(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Skipped => "warning",
            SyncStatus::Failed => "error",
        }
    }
}

/// One recorded sync attempt. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
    #[serde(rename = "tmdb_id", default)]
    pub external_id: String,
    /// Notion page id, empty when none was created or found.
    #[serde(default)]
    pub page_id: String,
    pub status: SyncStatus,
    pub time: String,
}

impl HistoryEntry {
    pub fn new(record: &MediaRecord, page_id: Option<&str>, status: SyncStatus) -> Self {
        Self {
            title: record.display_title().to_string(),
            media_type: record.media_type.clone().unwrap_or_default(),
            year: record
                .year
                .as_ref()
                .map(|y| y.to_string())
                .unwrap_or_default(),
            poster: record
                .poster
                .as_deref()
                .map(crate::mapper::poster_url)
                .unwrap_or_default(),
            external_id: record.external_id.clone().unwrap_or_default(),
            page_id: page_id.unwrap_or_default().to_string(),
            status,
            time: Local::now().format(TIME_FORMAT).to_string(),
        }
    }

    /// Key the delete endpoint accepts for this entry.
    pub fn delete_key(&self) -> &str {
        if self.page_id.is_empty() {
            &self.title
        } else {
            &self.page_id
        }
    }
}

/// History entry as rendered for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItemView {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub status_text: &'static str,
    pub status_color: &'static str,
    pub delete_key: String,
}

impl From<HistoryEntry> for HistoryItemView {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            status_text: entry.status.label(),
            status_color: entry.status.color(),
            delete_key: entry.delete_key().to_string(),
            entry,
        }
    }
}

/// Result of a delete-by-key request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// There is no history at all.
    NoHistory,
    /// Number of entries removed (may be zero).
    Removed(usize),
}

/// Append-only, capped sync history on top of a [`DataStore`].
#[derive(Clone)]
pub struct HistoryLog {
    store: Arc<dyn DataStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Entries in insertion order (oldest first).
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(load(self.store.as_ref(), HISTORY_KEY)?.unwrap_or_default())
    }

    /// Append an entry, evicting the oldest beyond [`HISTORY_LIMIT`].
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.entries()?;
        entries.push(entry);
        if entries.len() > HISTORY_LIMIT {
            let excess = entries.len() - HISTORY_LIMIT;
            entries.drain(..excess);
        }
        save(self.store.as_ref(), HISTORY_KEY, &entries)
    }

    /// Entries newest first, decorated for display.
    pub fn view(&self) -> Result<Vec<HistoryItemView>, StoreError> {
        let mut entries = self.entries()?;
        // Stable sort keeps insertion order for equal timestamps; reverse
        // first so later insertions win ties.
        entries.reverse();
        entries.sort_by(|a, b| b.time.cmp(&a.time));
        Ok(entries.into_iter().map(HistoryItemView::from).collect())
    }

    /// Remove entries whose page id or title equals `key`.
    pub fn delete(&self, key: &str) -> Result<DeleteOutcome, StoreError> {
        let entries = self.entries()?;
        if entries.is_empty() {
            return Ok(DeleteOutcome::NoHistory);
        }

        let before = entries.len();
        let kept: Vec<HistoryEntry> = entries
            .into_iter()
            .filter(|e| e.page_id != key && e.title != key)
            .collect();
        let removed = before - kept.len();

        save(self.store.as_ref(), HISTORY_KEY, &kept)?;
        Ok(DeleteOutcome::Removed(removed))
    }
}
