use std::{
    collections::{BTreeSet, HashMap},
    sync::Mutex,
    time::{Duration, Instant},
};

use async_trait::async_trait;

use crate::cache::{CacheError, CacheStore};

enum Value {
    Text(String),
    Set(BTreeSet<String>),
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.get(key).is_some_and(Entry::is_live)
    }

    /// Drops `key` as if its TTL had run out.
    pub fn expire(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .filter(|(_, e)| e.is_live())
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: Value::Text(value),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(Entry {
                value: Value::Text(v),
                expires_at,
            }) if expires_at.map_or(true, |at| Instant::now() < at) => Ok(v.clone()),
            _ => Err(CacheError::Miss),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live() {
                    e.value = Value::Set(BTreeSet::new());
                }
            })
            .or_insert_with(|| Entry {
                value: Value::Set(BTreeSet::new()),
                expires_at: None,
            });
        if let Value::Set(members) = &mut entry.value {
            members.insert(member.to_string());
        }
        entry.expires_at = Some(Instant::now() + ttl);
        Ok(())
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        let now_empty = match entries.get_mut(key) {
            Some(Entry {
                value: Value::Set(members),
                ..
            }) => {
                members.remove(member);
                members.is_empty()
            }
            _ => false,
        };
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn get_set_members(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry @ Entry {
                value: Value::Set(members),
                ..
            }) if entry.is_live() => Ok(members.iter().cloned().collect()),
            _ => Ok(Vec::new()),
        }
    }
}
