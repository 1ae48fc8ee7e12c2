//! Shared-secret authentication for the administrative API.

mod api_key;

pub use api_key::*;

use std::collections::HashMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    /// Decoded query string parameters.
    pub query: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}
