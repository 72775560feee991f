//! Object storage interface for cached grids and daily fire records.
//!
//! One client type covers every backend the cache can run on: an in-memory
//! store for tests, the local filesystem for single-node deployments and
//! S3/MinIO for shared deployments.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, memory::InMemory, path::Path, ObjectStore,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

use hex_common::{GridError, GridResult};

use crate::backend::{CacheStorage, StoredObject};

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Local,
    S3,
}

impl StorageBackend {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Some(Self::Memory),
            "local" | "fs" | "file" => Some(Self::Local),
            "s3" | "minio" => Some(Self::S3),
            _ => None,
        }
    }
}

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the local backend
    pub local_root: PathBuf,
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_root: PathBuf::from("data/cache"),
            endpoint: "http://minio:9000".to_string(),
            bucket: "fire-hexgrid".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

impl ObjectStorageConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CACHE_BACKEND") {
            if let Some(backend) = StorageBackend::parse(&val) {
                config.backend = backend;
            }
        }

        if let Ok(val) = std::env::var("CACHE_DIR") {
            config.local_root = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("S3_ENDPOINT") {
            config.endpoint = val;
        }

        if let Ok(val) = std::env::var("S3_BUCKET") {
            config.bucket = val;
        }

        if let Ok(val) = std::env::var("S3_ACCESS_KEY_ID") {
            config.access_key_id = val;
        }

        if let Ok(val) = std::env::var("S3_SECRET_ACCESS_KEY") {
            config.secret_access_key = val;
        }

        if let Ok(val) = std::env::var("S3_REGION") {
            config.region = val;
        }

        if let Ok(val) = std::env::var("S3_ALLOW_HTTP") {
            config.allow_http = val.to_lowercase() == "true" || val == "1";
        }

        config
    }
}

/// Object storage client.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    name: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> GridResult<Self> {
        match config.backend {
            StorageBackend::Memory => Ok(Self::in_memory()),
            StorageBackend::Local => Self::local(&config.local_root),
            StorageBackend::S3 => {
                let mut builder = AmazonS3Builder::new()
                    .with_endpoint(&config.endpoint)
                    .with_bucket_name(&config.bucket)
                    .with_access_key_id(&config.access_key_id)
                    .with_secret_access_key(&config.secret_access_key)
                    .with_region(&config.region);

                if config.allow_http {
                    builder = builder.with_allow_http(true);
                }

                let store = builder.build().map_err(|e| {
                    GridError::cache_io(format!("Failed to create S3 client: {}", e))
                })?;

                Ok(Self {
                    store: Arc::new(store),
                    name: format!("s3://{}", config.bucket),
                })
            }
        }
    }

    /// Volatile store, dropped with the process.
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
            name: "memory".to_string(),
        }
    }

    /// Filesystem store rooted at `root` (created if missing).
    pub fn local(root: impl Into<PathBuf>) -> GridResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let store = LocalFileSystem::new_with_prefix(&root).map_err(|e| {
            GridError::cache_io(format!("Failed to open {}: {}", root.display(), e))
        })?;

        Ok(Self {
            store: Arc::new(store),
            name: format!("file://{}", root.display()),
        })
    }

    /// Wrap an already-built store.
    pub fn from_store(store: Arc<dyn ObjectStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Write bytes to a path.
    #[instrument(skip(self, data), fields(store = %self.name, path = %path))]
    pub async fn put(&self, path: &str, data: Bytes) -> GridResult<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| GridError::cache_io(format!("Failed to write {}: {}", path, e)))?;

        Ok(())
    }

    /// Read bytes from a path, `None` if the object does not exist.
    #[instrument(skip(self), fields(store = %self.name, path = %path))]
    pub async fn get(&self, path: &str) -> GridResult<Option<Bytes>> {
        let location = Path::from(path);

        let result = match self.store.get(&location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => {
                return Err(GridError::cache_io(format!(
                    "Failed to read {}: {}",
                    path, e
                )))
            }
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| GridError::cache_io(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(Some(bytes))
    }

    /// List objects below a path prefix.
    pub async fn list(&self, prefix: &str) -> GridResult<Vec<StoredObject>> {
        use futures::TryStreamExt;

        let prefix = prefix.trim_matches('/');
        let prefix_path = Path::from(prefix);
        let mut objects = Vec::new();

        let mut stream = if prefix.is_empty() {
            self.store.list(None)
        } else {
            self.store.list(Some(&prefix_path))
        };

        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| GridError::cache_io(format!("List failed: {}", e)))?
        {
            objects.push(StoredObject {
                key: meta.location.to_string(),
                size: meta.size as u64,
                last_modified: meta.last_modified,
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    /// Delete an object; missing objects are ignored.
    #[instrument(skip(self), fields(store = %self.name, path = %path))]
    pub async fn delete(&self, path: &str) -> GridResult<()> {
        let location = Path::from(path);

        match self.store.delete(&location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(GridError::cache_io(format!(
                "Failed to delete {}: {}",
                path, e
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl CacheStorage for ObjectStorage {
    async fn read(&self, key: &str) -> GridResult<Option<Bytes>> {
        self.get(key).await
    }

    async fn write(&self, key: &str, data: Bytes) -> GridResult<()> {
        self.put(key, data).await
    }

    async fn list(&self, prefix: &str) -> GridResult<Vec<StoredObject>> {
        ObjectStorage::list(self, prefix).await
    }

    async fn delete(&self, key: &str) -> GridResult<()> {
        ObjectStorage::delete(self, key).await
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Path builder for consistent storage layout.
pub struct StoragePath;

impl StoragePath {
    /// Prefix under which all cached grids live.
    pub const GRIDS: &'static str = "grids";

    /// Prefix under which daily fire records live.
    pub const RECORDS: &'static str = "records";

    /// Build path for a cached grid.
    /// Format: grids/res{resolution:02}/{region_key}.json
    pub fn grid(resolution: u8, region_key: &str) -> String {
        format!("{}/res{:02}/{}.json", Self::GRIDS, resolution, region_key)
    }

    /// Split a grid path back into (resolution, region_key).
    pub fn parse_grid(path: &str) -> Option<(u8, String)> {
        let rest = path.strip_prefix(Self::GRIDS)?.strip_prefix('/')?;
        let (res_part, file) = rest.split_once('/')?;
        let resolution = res_part.strip_prefix("res")?.parse().ok()?;
        let region_key = file.strip_suffix(".json")?;
        Some((resolution, region_key.to_string()))
    }

    /// Build path for one day of fire records.
    /// Format: records/{YYYY-MM-DD}.json
    pub fn daily_records(date: chrono::NaiveDate) -> String {
        format!("{}/{}.json", Self::RECORDS, date.format("%Y-%m-%d"))
    }
}
