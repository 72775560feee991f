//! Storage test doubles.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};

use hex_common::{GridError, GridResult};
use storage::{CacheStorage, ObjectStorage, StoredObject};

/// Storage whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingStorage;

#[async_trait]
impl CacheStorage for FailingStorage {
    async fn read(&self, key: &str) -> GridResult<Option<Bytes>> {
        Err(GridError::cache_io(format!("read {} refused", key)))
    }

    async fn write(&self, key: &str, _data: Bytes) -> GridResult<()> {
        Err(GridError::cache_io(format!("write {} refused", key)))
    }

    async fn list(&self, prefix: &str) -> GridResult<Vec<StoredObject>> {
        Err(GridError::cache_io(format!("list {} refused", prefix)))
    }

    async fn delete(&self, key: &str) -> GridResult<()> {
        Err(GridError::cache_io(format!("delete {} refused", key)))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// In-memory storage counting reads and writes.
pub struct CountingStorage {
    inner: ObjectStorage,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for CountingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingStorage {
    pub fn new() -> Self {
        Self {
            inner: ObjectStorage::in_memory(),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn read(&self, key: &str) -> GridResult<Option<Bytes>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(key).await
    }

    async fn write(&self, key: &str, data: Bytes) -> GridResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(key, data).await
    }

    async fn list(&self, prefix: &str) -> GridResult<Vec<StoredObject>> {
        CacheStorage::list(&self.inner, prefix).await
    }

    async fn delete(&self, key: &str) -> GridResult<()> {
        CacheStorage::delete(&self.inner, key).await
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}
