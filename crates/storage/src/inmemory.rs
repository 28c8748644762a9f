use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use ledgerdb_errors::StorageError;
use parking_lot::RwLock;

use crate::store::{Key, KeyValueStore, KvIterator, Value};

/// Heap-backed store for tests and development. Keys are ordered by a
/// `BTreeMap`, so iteration order matches the persistent backends.
pub struct InMemoryStore {
    namespace: String,
    entries: RwLock<BTreeMap<Key, Value>>,
    closed: AtomicBool,
}

impl InMemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::StoreClosed(self.namespace.clone()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &[u8]) -> Result<Option<Value>, StorageError> {
        self.ensure_open()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn iter(&self) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        // Copy at call time, so the iterator is a true snapshot.
        let snapshot: Vec<(Key, Value)> =
            self.entries.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        let snapshot: Vec<(Key, Value)> = self
            .entries
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn close(&self) -> Result<(), StorageError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
