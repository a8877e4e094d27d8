use super::{expiry_from, KeyValueStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry recorded for a key, if any
    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(key).and_then(|e| e.expires_at)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|entry| match entry.expires_at {
            Some(at) if at <= Utc::now() => None,
            _ => Some(entry.value.clone()),
        }))
    }

    async fn set(&self, key: &str, value: &str, retention: Option<Duration>) -> StoreResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: expiry_from(retention),
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
