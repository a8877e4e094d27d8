//! Bounded, most-recent-first log of secret words used in past sessions.

use crate::store::{KeyValueStore, StoreResult};
use std::sync::Arc;
use std::time::Duration;

/// Storage key for the serialized history list
pub const WORD_HISTORY_KEY: &str = "wordHistory";

/// Maximum number of words kept in history
pub const MAX_HISTORY_SIZE: usize = 100;

/// Retention hint for the history record (about a year)
pub const HISTORY_RETENTION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

pub struct WordHistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl WordHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Previously used words, most recent first.
    ///
    /// Missing or unreadable history is treated as empty.
    pub async fn load(&self) -> Vec<String> {
        let raw = match self.store.get(WORD_HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read word history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!("Word history is corrupt, starting fresh: {}", e);
                Vec::new()
            }
        }
    }

    /// Put `word` at the front of the history and persist the newest 100 entries.
    ///
    /// Load and save form one logical transaction; callers must not interleave
    /// two `record` calls.
    pub async fn record(&self, word: &str) {
        if let Err(e) = self.try_record(word).await {
            tracing::error!("Error saving word history: {}", e);
        }
    }

    async fn try_record(&self, word: &str) -> StoreResult<()> {
        let mut history = self.load().await;
        history.insert(0, word.to_string());
        history.truncate(MAX_HISTORY_SIZE);
        self.save(&history).await
    }

    pub async fn contains(&self, word: &str) -> bool {
        self.load().await.iter().any(|w| w == word)
    }

    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) -> StoreResult<()> {
        self.save(&[]).await
    }

    async fn save(&self, history: &[String]) -> StoreResult<()> {
        let json = serde_json::to_string(history)?;
        self.store
            .set(WORD_HISTORY_KEY, &json, Some(HISTORY_RETENTION))
            .await
    }
}
