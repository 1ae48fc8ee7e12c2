use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notionsync_core::{
    load_config, validate_config, ApiKeyAuthenticator, Config, DataStore, NotionClient,
    NotionGateway, Notifier, SqliteDataStore, SyncService, WebhookNotifier,
};
use notionsync_server::api::create_router;
use notionsync_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("NOTIONSYNC_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Configuration loaded (hash {})", &config_hash[..16]);
    info!("Database path: {:?}", config.database.path);

    // Create authenticator
    let authenticator = Arc::new(
        ApiKeyAuthenticator::from_config(&config.auth)
            .context("Failed to create authenticator")?,
    );
    info!("Administrative API requires an API key");

    // Create SQLite store (history and synced keys)
    let store: Arc<dyn DataStore> = Arc::new(
        SqliteDataStore::new(&config.database.path).context("Failed to create data store")?,
    );
    info!("Data store initialized");

    let gateway = create_gateway(&config);
    let notifier = create_notifier(&config);

    let sync = Arc::new(SyncService::new(
        config.sync.clone(),
        gateway,
        store,
        notifier,
    ));
    if sync.is_active() {
        info!("Notion sync active");
    } else {
        warn!("Notion sync inactive, events will be ignored");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), authenticator, sync));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Notion client, when sync is enabled and credentials are present.
fn create_gateway(config: &Config) -> Option<Arc<dyn NotionGateway>> {
    if !config.sync.enabled {
        info!("Sync disabled in config");
        return None;
    }
    match &config.notion {
        Some(notion) if notion.is_complete() => match NotionClient::new(notion) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                error!("Failed to create Notion client: {}", e);
                None
            }
        },
        _ => {
            warn!("Notion token or database id missing");
            None
        }
    }
}

fn create_notifier(config: &Config) -> Option<Arc<dyn Notifier>> {
    let notify = config.notify.as_ref()?;
    match WebhookNotifier::new(notify) {
        Ok(notifier) => {
            info!("Notifications via webhook {}", notify.webhook_url);
            Some(Arc::new(notifier))
        }
        Err(e) => {
            error!("Failed to create notifier: {}", e);
            None
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
