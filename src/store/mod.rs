//! Persistent key-value capability handed to the session and history stores.
//!
//! Core logic never touches global storage; it only sees a `KeyValueStore`.

mod file;
mod memory;

use async_trait::async_trait;
use std::time::Duration;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing persisted data
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value storage with an optional retention hint per entry
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Expired entries read as `None`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value. `retention` asks the store to forget it after that long.
    async fn set(&self, key: &str, value: &str, retention: Option<Duration>) -> StoreResult<()>;

    /// Remove a value; removing a missing key is not an error
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Convert a retention hint to an absolute expiry timestamp
pub(crate) fn expiry_from(retention: Option<Duration>) -> Option<chrono::DateTime<chrono::Utc>> {
    retention
        .and_then(|r| chrono::Duration::from_std(r).ok())
        .and_then(|r| chrono::Utc::now().checked_add_signed(r))
}
