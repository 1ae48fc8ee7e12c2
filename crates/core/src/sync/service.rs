//! Transfer-complete handling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::gate::{dedup_key, SyncedKeys, PENDING};
use crate::config::SyncConfig;
use crate::history::{DeleteOutcome, HistoryEntry, HistoryItemView, HistoryLog, SyncStatus};
use crate::mapper::{self, PropertyMap};
use crate::media::{MediaRecord, TransferCompleteEvent};
use crate::metrics::SYNC_EVENTS;
use crate::notify::{Notification, Notifier};
use crate::notion::{ConnectionInfo, NotionError, NotionGateway};
use crate::store::{DataStore, StoreError};

/// What happened to one transfer-complete event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Sync disabled or Notion not configured.
    Inactive,
    /// Media type not in the allow-list.
    Filtered { media_type: String },
    /// Payload without media info.
    InvalidEvent,
    /// Key already synced, or a create for it is in flight.
    AlreadySynced { key: String },
    /// A page with the same title already exists.
    Skipped { page_id: String },
    Created { page_id: String },
    Failed { reason: String },
}

impl SyncOutcome {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Inactive => "inactive",
            SyncOutcome::Filtered { .. } => "filtered",
            SyncOutcome::InvalidEvent => "invalid_event",
            SyncOutcome::AlreadySynced { .. } => "already_synced",
            SyncOutcome::Skipped { .. } => "skipped",
            SyncOutcome::Created { .. } => "created",
            SyncOutcome::Failed { .. } => "failed",
        }
    }
}

/// Keys with a create in flight in this process, with how many.
type Reservations = Arc<StdMutex<HashMap<String, usize>>>;

/// Marks a key as being created. Released on drop, so a cancelled request
/// never leaves a live-looking reservation behind.
struct Reservation {
    reservations: Reservations,
    key: String,
}

impl Reservation {
    fn new(reservations: &Reservations, key: &str) -> Self {
        *reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert(0) += 1;
        Self {
            reservations: Arc::clone(reservations),
            key: key.to_string(),
        }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        let mut reservations = self
            .reservations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(count) = reservations.get_mut(&self.key) {
            *count -= 1;
            if *count == 0 {
                reservations.remove(&self.key);
            }
        }
    }
}

/// Process-scoped sync context: owns the gateway and the sync mutex.
pub struct SyncService {
    config: SyncConfig,
    gateway: Option<Arc<dyn NotionGateway>>,
    notifier: Option<Arc<dyn Notifier>>,
    keys: SyncedKeys,
    history: HistoryLog,
    /// Held around every synced-key read-modify-write.
    sync_lock: Mutex<()>,
    reservations: Reservations,
}

impl SyncService {
    pub fn new(
        config: SyncConfig,
        gateway: Option<Arc<dyn NotionGateway>>,
        store: Arc<dyn DataStore>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            config,
            gateway,
            notifier,
            keys: SyncedKeys::new(Arc::clone(&store)),
            history: HistoryLog::new(store),
            sync_lock: Mutex::new(()),
            reservations: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Enabled and holding a gateway.
    pub fn is_active(&self) -> bool {
        self.config.enabled && self.gateway.is_some()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Handle one transfer-complete event.
    pub async fn handle_transfer_complete(&self, event: &TransferCompleteEvent) -> SyncOutcome {
        let outcome = self.process(event).await;
        SYNC_EVENTS.with_label_values(&[outcome.as_str()]).inc();
        outcome
    }

    async fn process(&self, event: &TransferCompleteEvent) -> SyncOutcome {
        let gateway = match (&self.gateway, self.config.enabled) {
            (Some(gateway), true) => Arc::clone(gateway),
            _ => return SyncOutcome::Inactive,
        };

        let Some(record) = MediaRecord::from_event(event) else {
            warn!("Transfer-complete event without mediainfo, ignoring");
            return SyncOutcome::InvalidEvent;
        };

        if !self.type_allowed(&record) {
            let media_type = record.media_type.clone().unwrap_or_default();
            info!(
                "Skipping media type {}: {}",
                media_type,
                record.display_title()
            );
            return SyncOutcome::Filtered { media_type };
        }

        if let Some(transfer) = &event.transferinfo {
            debug!(
                "Transfer info: success={:?} path={:?} files={:?}",
                transfer.success, transfer.target_path, transfer.file_count
            );
        }

        match self.sync_record(gateway.as_ref(), &record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Sync state error for {}: {}", record.display_title(), e);
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn type_allowed(&self, record: &MediaRecord) -> bool {
        if self.config.media_types.is_empty() {
            return true;
        }
        let raw = record
            .media_type
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let slug = record.kind().slug();
        self.config.media_types.iter().any(|allowed| {
            let allowed = allowed.trim().to_lowercase();
            allowed == raw || allowed == slug
        })
    }

    async fn sync_record(
        &self,
        gateway: &dyn NotionGateway,
        record: &MediaRecord,
    ) -> Result<SyncOutcome, StoreError> {
        let title = record.display_title().to_string();
        let key = dedup_key(record);
        info!("Syncing to Notion: {} (key {:?})", title, key);

        let (properties, reservation) = {
            let _guard = self.sync_lock.lock().await;

            if let Some(key) = &key {
                if let Some(value) = self.keys.get(key)? {
                    if !self.is_stale(key, &value) {
                        info!("Already synced: {} ({} -> {})", title, key, value);
                        return Ok(SyncOutcome::AlreadySynced { key: key.clone() });
                    }
                    warn!("Retrying stale pending key {} for {}", key, title);
                }
            }

            let properties = mapper::build_properties(record);

            if self.config.skip_existing {
                if let Some(outcome) = self
                    .skip_if_exists(gateway, record, key.as_deref(), &properties)
                    .await?
                {
                    return Ok(outcome);
                }
            }

            let reservation = match &key {
                Some(key) => {
                    self.keys.set(key, PENDING)?;
                    Some(Reservation::new(&self.reservations, key))
                }
                None => None,
            };
            (properties, reservation)
        };

        let page_id = gateway.create_page(properties).await;

        let guard = self.sync_lock.lock().await;
        drop(reservation);

        match page_id {
            Some(page_id) => {
                info!("Notion sync succeeded: {} -> {}", title, page_id);
                self.record_history(record, Some(&page_id), SyncStatus::Success);
                if let Some(key) = &key {
                    if let Err(e) = self.keys.set(key, &page_id) {
                        error!("Failed to store synced key {}: {}", key, e);
                    }
                }
                drop(guard);

                if self.config.notify {
                    self.notify(record).await;
                }
                Ok(SyncOutcome::Created { page_id })
            }
            None => {
                error!("Notion sync failed: {}", title);
                self.record_history(record, None, SyncStatus::Failed);
                if let Some(key) = &key {
                    if let Err(e) = self.keys.remove(key) {
                        error!("Failed to release synced key {}: {}", key, e);
                    }
                }
                Ok(SyncOutcome::Failed {
                    reason: "Notion page creation failed".to_string(),
                })
            }
        }
    }

    /// A `pending` value this process is not actively working on.
    fn is_stale(&self, key: &str, value: &str) -> bool {
        value == PENDING
            && !self
                .reservations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(key)
    }

    async fn skip_if_exists(
        &self,
        gateway: &dyn NotionGateway,
        record: &MediaRecord,
        key: Option<&str>,
        properties: &PropertyMap,
    ) -> Result<Option<SyncOutcome>, StoreError> {
        let Some(title) = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            return Ok(None);
        };
        let Some(page_id) = gateway.find_by_title(title).await else {
            return Ok(None);
        };

        info!("Skipping existing entry: {} ({})", title, page_id);
        self.record_history(record, None, SyncStatus::Skipped);
        if let Some(key) = key {
            self.keys.set(key, &page_id)?;
        }

        if self.config.refresh_existing {
            if gateway.update_page(&page_id, properties.clone()).await {
                info!("Refreshed existing page {}", page_id);
            } else {
                warn!("Failed to refresh existing page {}", page_id);
            }
        }

        Ok(Some(SyncOutcome::Skipped { page_id }))
    }

    fn record_history(&self, record: &MediaRecord, page_id: Option<&str>, status: SyncStatus) {
        let entry = HistoryEntry::new(record, page_id, status);
        if let Err(e) = self.history.append(entry) {
            error!("Failed to save sync history: {}", e);
        }
    }

    async fn notify(&self, record: &MediaRecord) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let poster = record.poster.as_deref().map(mapper::poster_url);
        let notification = Notification::synced(record.display_title(), poster);
        if let Err(e) = notifier.send(&notification).await {
            warn!("Failed to send notification: {}", e);
        }
    }

    // =========================================================================
    // Administrative operations
    // =========================================================================

    pub fn history(&self) -> Result<Vec<HistoryItemView>, StoreError> {
        self.history.view()
    }

    pub fn delete_history(&self, key: &str) -> Result<DeleteOutcome, StoreError> {
        self.history.delete(key)
    }

    /// Forget every synced key. Returns how many were dropped.
    pub async fn clear_synced_keys(&self) -> Result<usize, StoreError> {
        let _guard = self.sync_lock.lock().await;
        let cleared = self.keys.clear()?;
        info!("Cleared {} synced keys", cleared);
        Ok(cleared)
    }

    pub async fn test_connection(&self) -> Result<ConnectionInfo, NotionError> {
        match &self.gateway {
            Some(gateway) => gateway.test_connection().await,
            None => Err(NotionError::NotConfigured(
                "Notion client is not initialized".to_string(),
            )),
        }
    }
}
