//! Notifications sent after a page is created.

mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used for every sync notification.
pub const NOTIFICATION_TITLE: &str = "Notion媒体同步";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Notification endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier not configured: {0}")]
    NotConfigured(String),
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Notification {
    /// "已同步: <title>" with the poster attached.
    pub fn synced(title: &str, poster: Option<String>) -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            text: format!("已同步: {}", title),
            image: poster,
        }
    }
}

/// Delivery channel for notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
