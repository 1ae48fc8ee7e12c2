use std::sync::Arc;

use notionsync_core::{ApiKeyAuthenticator, Config, SanitizedConfig, SyncService};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<ApiKeyAuthenticator>,
    sync: Arc<SyncService>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<ApiKeyAuthenticator>,
        sync: Arc<SyncService>,
    ) -> Self {
        Self {
            config,
            authenticator,
            sync,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &ApiKeyAuthenticator {
        self.authenticator.as_ref()
    }

    pub fn sync(&self) -> &SyncService {
        self.sync.as_ref()
    }
}
