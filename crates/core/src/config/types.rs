use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub notion: Option<NotionConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8787
}

/// Authentication configuration for the administrative API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret every administrative request must present
    pub api_key: String,
}

/// State database configuration (history and synced keys)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("notionsync.db")
}

/// Sync behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Send a notification after each page is created
    #[serde(default = "default_true")]
    pub notify: bool,
    /// Query Notion by title before creating and skip items already there
    #[serde(default = "default_true")]
    pub skip_existing: bool,
    /// When an existing page is found, push fresh properties to it
    #[serde(default)]
    pub refresh_existing: bool,
    /// Media type allow-list ("movie", "tv", ...). Empty syncs everything.
    #[serde(default)]
    pub media_types: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify: true,
            skip_existing: true,
            refresh_existing: false,
            media_types: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Notion integration configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotionConfig {
    /// Integration token ("secret_..." or "ntn_...")
    #[serde(default)]
    pub token: String,
    /// Database id, dashed UUID, or the database URL
    #[serde(default)]
    pub database_id: String,
    /// API base URL (default: https://api.notion.com/v1)
    #[serde(default = "default_notion_base_url")]
    pub base_url: String,
    /// Value of the Notion-Version header
    #[serde(default = "default_notion_version")]
    pub api_version: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            database_id: String::new(),
            base_url: default_notion_base_url(),
            api_version: default_notion_version(),
            timeout_secs: default_timeout(),
        }
    }
}

impl NotionConfig {
    /// Both the token and the database id are set.
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.database_id.trim().is_empty()
    }
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2025-09-03".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Notification webhook configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// URL receiving a JSON POST per notification
    pub webhook_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion: Option<SanitizedNotionConfig>,
    pub notify_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub api_key_configured: bool,
}

/// Sanitized Notion config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotionConfig {
    pub token_configured: bool,
    pub database_id: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                api_key_configured: !config.auth.api_key.trim().is_empty(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            sync: config.sync.clone(),
            notion: config.notion.as_ref().map(|n| SanitizedNotionConfig {
                token_configured: !n.token.is_empty(),
                database_id: n.database_id.clone(),
                base_url: n.base_url.clone(),
                api_version: n.api_version.clone(),
                timeout_secs: n.timeout_secs,
            }),
            notify_configured: config.notify.is_some(),
        }
    }
}
