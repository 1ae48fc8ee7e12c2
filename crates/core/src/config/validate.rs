use super::{types::Config, ConfigError};
use crate::notion::normalize_database_id;

/// Validate configuration
///
/// An enabled sync without Notion credentials is not an error: the service
/// starts inert and logs why.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.api_key cannot be empty".to_string(),
        ));
    }

    if config.sync.media_types.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "sync.media_types cannot contain empty entries".to_string(),
        ));
    }

    if let Some(notion) = &config.notion {
        if !notion.database_id.trim().is_empty()
            && normalize_database_id(&notion.database_id).is_none()
        {
            return Err(ConfigError::ValidationError(format!(
                "notion.database_id is not a Notion id or database URL: {}",
                notion.database_id
            )));
        }
        if notion.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "notion.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, DatabaseConfig, NotionConfig, ServerConfig, SyncConfig,
    };
    use std::net::IpAddr;

    fn base_config() -> Config {
        Config {
            auth: AuthConfig {
                api_key: "host-token".to_string(),
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            notion: None,
            notify: None,
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_api_key_required() {
        let mut config = base_config();
        config.auth.api_key = "  ".to_string();
        assert!(validate_config(&config).is_err());

        config.auth.api_key = "token".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_database_id() {
        let mut config = base_config();
        config.notion = Some(NotionConfig {
            token: "secret".to_string(),
            database_id: "not-an-id".to_string(),
            ..Default::default()
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_database_url_accepted() {
        let mut config = base_config();
        config.notion = Some(NotionConfig {
            token: "secret".to_string(),
            database_id: "https://www.notion.so/team/Movies-0123456789abcdef0123456789abcdef?v=1"
                .to_string(),
            ..Default::default()
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_missing_notion_credentials_is_not_fatal() {
        let mut config = base_config();
        config.sync.enabled = true;
        config.notion = Some(NotionConfig::default());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_media_type_fails() {
        let mut config = base_config();
        config.sync.media_types = vec!["movie".to_string(), "".to_string()];
        assert!(validate_config(&config).is_err());
    }
}
