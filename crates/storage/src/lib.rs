//! Storage abstractions for the fire hexgrid services.
//!
//! Provides unified interfaces for:
//! - Byte-oriented cache storage (in-memory, local filesystem, S3/MinIO)
//! - The read-only fire record store

pub mod backend;
pub mod object_store;
pub mod record_store;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig, StorageBackend, StoragePath};
pub use backend::{CacheStorage, StoredObject};
pub use record_store::{InMemoryRecordStore, ObjectStoreRecordStore, RangeRecords, RecordStore};
