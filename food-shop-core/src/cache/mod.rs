use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

mod redis_cache;

pub use self::redis_cache::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,
    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value and set operations with expiry.
///
/// Each call is a single atomic operation of the backing store. Values are
/// opaque strings; [`CacheStoreExt`] adds JSON encoding on top.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Returns [`CacheError::Miss`] when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Adds `member` to the set at `key` and resets the set's expiry.
    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<(), CacheError>;

    /// An absent set yields an empty list.
    async fn get_set_members(&self, key: &str) -> Result<Vec<String>, CacheError>;
}

#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw, ttl).await
    }

    async fn get_json<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        let raw = self.get(key).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl<C: CacheStore + ?Sized> CacheStoreExt for C {}

pub fn session_key(session_id: &uuid::Uuid) -> String {
    format!("session:{session_id}")
}

pub fn user_sessions_key(user_id: &uuid::Uuid) -> String {
    format!("user_sessions:{user_id}")
}

pub fn magic_link_key(code: &uuid::Uuid) -> String {
    format!("magic-link:{code}")
}

pub fn user_key(user_id: &uuid::Uuid) -> String {
    format!("user:{user_id}")
}
