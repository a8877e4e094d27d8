use super::{expiry_from, KeyValueStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Store backed by a single JSON document on disk.
///
/// Every write rewrites the whole document through a temp file and a rename,
/// so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> StoreResult<HashMap<String, Entry>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like `read_document`, but a corrupt document is dropped instead of failing
    async fn read_for_update(&self) -> StoreResult<HashMap<String, Entry>> {
        match self.read_document().await {
            Err(super::StoreError::Serialization(e)) => {
                tracing::warn!(
                    "Store file {} is corrupt ({}), starting from an empty document",
                    self.path.display(),
                    e
                );
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    async fn write_document(&self, doc: &HashMap<String, Entry>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(doc)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let doc = self.read_document().await?;
        let now = Utc::now();
        Ok(doc
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, retention: Option<Duration>) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_for_update().await?;

        let now = Utc::now();
        doc.retain(|_, e| e.is_live(now));
        doc.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: expiry_from(retention),
            },
        );

        self.write_document(&doc).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.read_for_update().await?;
        if doc.remove(key).is_some() {
            self.write_document(&doc).await?;
        }
        Ok(())
    }
}
