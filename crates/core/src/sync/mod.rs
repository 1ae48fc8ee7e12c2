//! Sync of transfer-complete events into Notion.
//!
//! [`SyncService`] runs the whole flow: filter, dedup against the
//! persisted synced-key map, optional remote title check, create, settle.
//! One async mutex serializes the key checks and the settlement; the remote
//! create runs outside it.

mod gate;
mod service;

pub use gate::{dedup_key, SyncedKeys, PENDING, SYNCED_KEYS_KEY};
pub use service::{SyncOutcome, SyncService};
