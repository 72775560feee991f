//! Byte-oriented key/value persistence used by the grid cache.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hex_common::GridResult;

/// Metadata of one stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Pluggable backing store for cached grids.
///
/// Implementations must make `write` an idempotent overwrite: concurrent
/// writers of the same key race harmlessly.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Read the bytes stored under `key`, `None` when absent.
    async fn read(&self, key: &str) -> GridResult<Option<Bytes>>;

    /// Store `data` under `key`, replacing any previous value.
    async fn write(&self, key: &str, data: Bytes) -> GridResult<()>;

    /// List stored objects whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> GridResult<Vec<StoredObject>>;

    /// Delete `key`; deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> GridResult<()>;

    /// Human-readable backend name for logs.
    fn describe(&self) -> String;
}
