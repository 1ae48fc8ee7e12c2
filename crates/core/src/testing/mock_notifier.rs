//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notify::{Notification, Notifier, NotifyError};

/// Records notifications instead of sending them.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<Notification>>>,
    fail: Arc<RwLock<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }

    /// Make every send fail.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if *self.fail.read().await {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        self.sent.write().await.push(notification.clone());
        Ok(())
    }
}
