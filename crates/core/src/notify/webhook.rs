//! Generic JSON webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{Notification, Notifier, NotifyError};
use crate::config::NotifyConfig;

/// POSTs each notification as JSON to a configured URL.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let url = config.webhook_url.trim();
        if url.is_empty() {
            return Err(NotifyError::NotConfigured(
                "notify.webhook_url is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1) as u64))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        debug!("Sending notification to {}: {}", self.url, notification.text);

        let response = self.client.post(&self.url).json(notification).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
