use std::time::Duration;

use food_shop_core::config::{parse_or, AuthConfig, ConfigError};

/// Settings that only the HTTP surface needs.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub port: u16,
    pub cookie_name: String,
    pub request_timeout: Duration,
    /// Lifetime of the session cookie; matches the session record's.
    pub cookie_max_age: Duration,
}

impl ApiConfig {
    pub fn from_env(auth: &AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or("API_PORT", 8080)?,
            cookie_name: parse_or("COOKIE_NAME", "food_shop_session".to_string())?,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            cookie_max_age: auth.session_ttl,
        })
    }
}
