//! Integration test: the filesystem backend behaves like the in-memory one.

use bytes::Bytes;
use storage::{CacheStorage, ObjectStorage, ObjectStorageConfig, StorageBackend, StoragePath};

#[tokio::test]
async fn test_local_backend_write_list_delete() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ObjectStorage::local(dir.path().join("cache")).unwrap();

    storage
        .write(&StoragePath::grid(6, "global"), Bytes::from_static(b"grid-6"))
        .await
        .unwrap();
    storage
        .write(&StoragePath::grid(7, "global"), Bytes::from_static(b"grid-7!"))
        .await
        .unwrap();

    let listed = storage.list(StoragePath::GRIDS).await.unwrap();
    let keys: Vec<_> = listed.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["grids/res06/global.json", "grids/res07/global.json"]);
    assert_eq!(listed[0].size, 6);
    assert_eq!(listed[1].size, 7);

    storage.delete(&StoragePath::grid(6, "global")).await.unwrap();
    assert!(storage
        .read(&StoragePath::grid(6, "global"))
        .await
        .unwrap()
        .is_none());

    // Deleting twice is not an error.
    storage.delete(&StoragePath::grid(6, "global")).await.unwrap();
}

#[tokio::test]
async fn test_local_backend_overwrite_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ObjectStorage::local(dir.path()).unwrap();
    let key = StoragePath::grid(6, "global");

    storage.write(&key, Bytes::from_static(b"first")).await.unwrap();
    storage.write(&key, Bytes::from_static(b"second")).await.unwrap();

    let bytes = storage.read(&key).await.unwrap().unwrap();
    assert_eq!(&bytes[..], b"second");
    assert_eq!(storage.list("grids").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_of_missing_prefix_is_empty() {
    let storage = ObjectStorage::in_memory();
    assert!(storage.list("grids").await.unwrap().is_empty());
}

#[test]
fn test_config_selects_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = ObjectStorageConfig {
        backend: StorageBackend::Local,
        local_root: dir.path().to_path_buf(),
        ..Default::default()
    };
    let storage = ObjectStorage::new(&config).unwrap();
    assert!(storage.describe().starts_with("file://"));

    let memory = ObjectStorage::new(&ObjectStorageConfig {
        backend: StorageBackend::Memory,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(memory.describe(), "memory");
}
