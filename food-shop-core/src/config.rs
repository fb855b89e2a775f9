use std::{env, fs, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("cannot read {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Settings for sessions, tokens and magic links.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub private_key_pem: Vec<u8>,
    pub public_key_pem: Vec<u8>,
    pub token_issuer: String,
    pub session_ttl: Duration,
    pub cache_ttl: Duration,
    pub api_base_url: String,
    pub redirect_url: String,
}

impl AuthConfig {
    pub const MAGIC_LINK_TTL: Duration = Duration::from_secs(15 * 60);
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_pool_size: usize,
    pub redis_url: String,
    pub kafka_hosts: Vec<String>,
    pub email_topic: String,
    pub auth: AuthConfig,
}

impl Config {
    /// Reads configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let session_exp_hours: u64 = parse_or("SESSION_EXP_HOURS", 24)?;
        if session_exp_hours == 0 {
            return Err(invalid("SESSION_EXP_HOURS", "0"));
        }
        let cache_exp_minutes: u64 = parse_or("CACHE_EXP_MINUTES", 10)?;
        if cache_exp_minutes == 0 {
            return Err(invalid("CACHE_EXP_MINUTES", "0"));
        }

        let auth = AuthConfig {
            private_key_pem: read_key("PRIVATE_KEY_PATH", "ec_private_key.pem")?,
            public_key_pem: read_key("PUBLIC_KEY_PATH", "ec_public_key.pem")?,
            token_issuer: var_or("TOKEN_ISSUER", "food-shop"),
            session_ttl: Duration::from_secs(session_exp_hours * 60 * 60),
            cache_ttl: Duration::from_secs(cache_exp_minutes * 60),
            api_base_url: var("API_BASE_URL")?.trim_end_matches('/').to_string(),
            redirect_url: var("REDIRECT_URL")?,
        };

        let kafka_hosts = var_or("KAFKA_HOSTS", "localhost:9092")
            .split(',')
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect::<Vec<_>>();
        if kafka_hosts.is_empty() {
            return Err(ConfigError::Missing("KAFKA_HOSTS"));
        }

        Ok(Self {
            database_url: var("DATABASE_URL")?,
            database_pool_size: parse_or("DATABASE_POOL_SIZE", 10)?,
            redis_url: var_or("REDIS_URL", "redis://127.0.0.1:6379"),
            kafka_hosts,
            email_topic: var_or("EMAIL_TOPIC", "send_email_queue"),
            auth,
        })
    }
}

fn var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn var_or(name: &'static str, default: &str) -> String {
    var(name).unwrap_or_else(|_| default.to_string())
}

pub fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value.parse().map_err(|_| invalid(name, &value)),
        _ => Ok(default),
    }
}

fn invalid(name: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
    }
}

fn read_key(name: &'static str, default: &str) -> Result<Vec<u8>, ConfigError> {
    let path = PathBuf::from(var_or(name, default));
    fs::read(&path).map_err(|source| ConfigError::KeyFile { path, source })
}
