pub mod auth;
pub mod config;
pub mod history;
pub mod mapper;
pub mod media;
pub mod metrics;
pub mod notify;
pub mod notion;
pub mod store;
pub mod sync;
pub mod testing;

pub use auth::{ApiKeyAuthenticator, AuthError, AuthRequest, Identity};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, Config,
    ConfigError, DatabaseConfig, NotifyConfig, NotionConfig, SanitizedConfig, ServerConfig,
    SyncConfig,
};
pub use history::{DeleteOutcome, HistoryEntry, HistoryItemView, HistoryLog, SyncStatus};
pub use mapper::{build_properties, PropertyMap};
pub use media::{MediaRecord, TransferCompleteEvent};
pub use notify::{Notification, Notifier, NotifyError, WebhookNotifier};
pub use notion::{ConnectionInfo, NotionClient, NotionError, NotionGateway};
pub use store::{DataStore, SqliteDataStore, StoreError};
pub use sync::{SyncOutcome, SyncService};
