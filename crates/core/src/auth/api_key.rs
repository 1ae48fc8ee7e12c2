//! Shared-secret authentication for the administrative API.

use super::{AuthError, AuthRequest, Identity};
use crate::config::AuthConfig;

/// Query parameter the media manager's UI appends to plugin API calls.
pub const API_KEY_QUERY_PARAM: &str = "apikey";

/// Authenticator that validates requests against the configured API token.
///
/// Accepts the key in either:
/// - `Authorization: Bearer <key>` header
/// - `X-API-Key: <key>` header
/// - `?apikey=<key>` query parameter
pub struct ApiKeyAuthenticator {
    expected_key: String,
}

impl ApiKeyAuthenticator {
    pub fn new(api_key: String) -> Self {
        Self {
            expected_key: api_key,
        }
    }

    /// Build from `[auth]`. The key must be non-blank.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let key = config.api_key.trim();
        if key.is_empty() {
            return Err(AuthError::ConfigurationError(
                "auth.api_key must be set".to_string(),
            ));
        }
        Ok(Self::new(key.to_string()))
    }

    fn extract_key<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(auth_header) = request.headers.get("authorization") {
            if let Some(key) = auth_header
                .strip_prefix("Bearer ")
                .or_else(|| auth_header.strip_prefix("bearer "))
            {
                return Some(key);
            }
        }

        if let Some(key) = request.headers.get("x-api-key") {
            return Some(key);
        }

        request.query.get(API_KEY_QUERY_PARAM).map(String::as_str)
    }

    /// Check the request's key against the configured one.
    pub fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided_key = self
            .extract_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided_key.as_bytes(), self.expected_key.as_bytes()) {
            Ok(Identity {
                user_id: "host".to_string(),
                method: "api_key".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
