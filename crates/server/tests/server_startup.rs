use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Write a config with the state database inside `dir`
fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let db_path = dir.path().join("state.db");
    let content = format!(
        "{}\n[database]\npath = {:?}\n",
        body,
        db_path.to_string_lossy()
    );
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn api_key_config(port: u16) -> String {
    format!(
        r#"
[auth]
api_key = "startup-key"

[server]
host = "127.0.0.1"
port = {}

[sync]
enabled = true

[notion]
token = "secret_startup"
database_id = "0123456789abcdef0123456789abcdef"
"#,
        port
    )
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_notionsync"))
        .env("NOTIONSYNC_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_and_auth() {
    let port = get_available_port();
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &api_key_config(port));

    let mut server = spawn_server(&config_path).await;
    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["sync_active"], true);

    let response = client
        .get(format!("{}/history", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .get(format!("{}/config?apikey=startup-key", base))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let config: serde_json::Value = response.json().await.unwrap();
    assert_eq!(config["auth"]["api_key_configured"], true);
    assert!(!config.to_string().contains("startup-key"));
    assert_eq!(config["server"]["port"], port);
    assert_eq!(config["notion"]["token_configured"], true);
    assert!(config["notion"].get("token").is_none());

    // Cleanup
    server.kill().await.ok();
}

#[tokio::test]
async fn test_env_override_disables_sync() {
    let port = get_available_port();
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &api_key_config(port));

    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_notionsync"))
        .env("NOTIONSYNC_CONFIG", &config_path)
        .env("NOTIONSYNC_SYNC__ENABLED", "false")
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");
    assert!(wait_for_server(port, 60).await, "Server did not start in time");

    let health: serde_json::Value = Client::new()
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["sync_active"], false);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_notionsync"))
            .env("NOTIONSYNC_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_auth_without_api_key_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(
        &dir,
        r#"
[auth]
method = "none"

[server]
port = 8080
"#,
    );

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_notionsync"))
            .env("NOTIONSYNC_CONFIG", &config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}
