//! Backend-agnostic contract tests, instantiated for every built-in
//! backend.

use std::{path::Path, sync::Arc};

use tempfile::TempDir;

use crate::{
    config::{ATTR_DB, BackendKind, NamespaceConfig},
    registry::StorageBackendRegistry,
    store::KeyValueStore,
};
use ledgerdb_errors::StorageError;

fn setup_store(kind: BackendKind, dir: &Path) -> Arc<dyn KeyValueStore> {
    let registry = StorageBackendRegistry::with_default_backends();
    let config = NamespaceConfig::new(ATTR_DB, kind).with_path(dir.join(ATTR_DB));
    registry.create(&config).unwrap()
}

fn test_put_get_round_trip(store: Arc<dyn KeyValueStore>) {
    assert_eq!(store.get(b"alice").unwrap(), None);

    store.put(b"alice", b"role=TRUST_ANCHOR").unwrap();
    assert_eq!(
        store.get(b"alice").unwrap(),
        Some(b"role=TRUST_ANCHOR".to_vec())
    );
}

fn test_put_is_an_upsert(store: Arc<dyn KeyValueStore>) {
    store.put(b"k", b"v1").unwrap();
    store.put(b"k", b"v2").unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(b"v2".to_vec()));
}

fn test_delete_removes_key_and_tolerates_absence(store: Arc<dyn KeyValueStore>) {
    store.put(b"k", b"v").unwrap();
    store.delete(b"k").unwrap();
    assert_eq!(store.get(b"k").unwrap(), None);

    // Deleting a key that was never written is not an error.
    store.delete(b"missing").unwrap();
}

fn test_iter_yields_entries_in_key_order(store: Arc<dyn KeyValueStore>) {
    store.put(b"b", b"2").unwrap();
    store.put(b"a", b"1").unwrap();
    store.put(b"c", b"3").unwrap();

    let entries: Vec<_> = store.iter().unwrap().collect();
    assert_eq!(
        entries,
        vec![
            (b"a".to_vec(), b"1".to_vec()),
            (b"b".to_vec(), b"2".to_vec()),
            (b"c".to_vec(), b"3".to_vec()),
        ]
    );
}

fn test_iter_prefix_is_bounded(store: Arc<dyn KeyValueStore>) {
    store.put(b"attr:alice", b"1").unwrap();
    store.put(b"attr:bob", b"2").unwrap();
    store.put(b"auth:carol", b"3").unwrap();
    store.put(b"aa", b"4").unwrap();

    let entries: Vec<_> = store.iter_prefix(b"attr:").unwrap().collect();
    assert_eq!(
        entries,
        vec![
            (b"attr:alice".to_vec(), b"1".to_vec()),
            (b"attr:bob".to_vec(), b"2".to_vec()),
        ]
    );
}

fn test_close_is_idempotent(store: Arc<dyn KeyValueStore>) {
    store.close().unwrap();
    store.close().unwrap();
}

fn test_operations_fail_after_close(store: Arc<dyn KeyValueStore>) {
    store.put(b"k", b"v").unwrap();
    store.close().unwrap();

    assert!(matches!(
        store.get(b"k"),
        Err(StorageError::StoreClosed(_))
    ));
    assert!(matches!(
        store.put(b"k", b"v"),
        Err(StorageError::StoreClosed(_))
    ));
    assert!(matches!(
        store.delete(b"k"),
        Err(StorageError::StoreClosed(_))
    ));
    assert!(store.iter().is_err());
}

macro_rules! generate_store_tests {
    ($test_fn:ident) => {
        paste::paste! {
            #[test]
            fn [<$test_fn _memory>]() {
                let temp_dir = TempDir::new().unwrap();
                $test_fn(setup_store(BackendKind::Memory, temp_dir.path()));
            }

            #[test]
            fn [<$test_fn _sled>]() {
                let temp_dir = TempDir::new().unwrap();
                $test_fn(setup_store(BackendKind::Sled, temp_dir.path()));
            }

            #[test]
            fn [<$test_fn _rocksdb>]() {
                let temp_dir = TempDir::new().unwrap();
                $test_fn(setup_store(BackendKind::RocksDb, temp_dir.path()));
            }
        }
    };
}

generate_store_tests!(test_put_get_round_trip);
generate_store_tests!(test_put_is_an_upsert);
generate_store_tests!(test_delete_removes_key_and_tolerates_absence);
generate_store_tests!(test_iter_yields_entries_in_key_order);
generate_store_tests!(test_iter_prefix_is_bounded);
generate_store_tests!(test_close_is_idempotent);
generate_store_tests!(test_operations_fail_after_close);

macro_rules! generate_persistence_tests {
    ($backend:ident) => {
        paste::paste! {
            #[test]
            fn [<data_survives_reopen_ $backend:lower>]() {
                let temp_dir = TempDir::new().unwrap();

                let store = setup_store(BackendKind::$backend, temp_dir.path());
                store.put(b"alice", b"role=TRUST_ANCHOR").unwrap();
                store.close().unwrap();
                drop(store);

                let reopened = setup_store(BackendKind::$backend, temp_dir.path());
                assert_eq!(
                    reopened.get(b"alice").unwrap(),
                    Some(b"role=TRUST_ANCHOR".to_vec())
                );
            }
        }
    };
}

generate_persistence_tests!(RocksDb);
generate_persistence_tests!(Sled);

#[test]
fn tuning_options_are_forwarded_to_the_backend() {
    let temp_dir = TempDir::new().unwrap();
    let registry = StorageBackendRegistry::with_default_backends();

    let config = NamespaceConfig::new(ATTR_DB, BackendKind::Sled)
        .with_path(temp_dir.path().join(ATTR_DB))
        .with_options(
            crate::config::TuningOptions::default().with_cache_capacity(64 * 1024 * 1024),
        );

    let store = registry.create(&config).unwrap();
    store.put(b"k", b"v").unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
}
