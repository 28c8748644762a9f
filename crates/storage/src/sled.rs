use std::sync::atomic::{AtomicBool, Ordering};

use ledgerdb_errors::StorageError;
use sled::Db;

use crate::{
    config::NamespaceConfig,
    store::{KeyValueStore, KvIterator, Value},
};

/// Sled-backed namespace store. Durability is periodic: sled flushes on
/// its background interval (`flush_every_ms`), and `close` forces a
/// final flush.
pub struct SledStore {
    namespace: String,
    db: Db,
    closed: AtomicBool,
}

impl SledStore {
    pub fn open(config: &NamespaceConfig) -> Result<Self, StorageError> {
        let mut sled_config = sled::Config::new().path(&config.path);

        if let Some(capacity) = config.options.cache_capacity {
            sled_config = sled_config.cache_capacity(capacity);
        }
        if let Some(flush_ms) = config.options.flush_every_ms {
            sled_config = sled_config.flush_every_ms(Some(flush_ms));
        }

        let db = sled_config.open().map_err(|e| StorageError::Open {
            namespace: config.name.clone(),
            source: e.into(),
        })?;

        Ok(Self {
            namespace: config.name.clone(),
            db,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::StoreClosed(self.namespace.clone()));
        }
        Ok(())
    }
}

impl KeyValueStore for SledStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &[u8]) -> Result<Option<Value>, StorageError> {
        self.ensure_open()?;
        self.db
            .get(key)
            .map(|value| value.map(|ivec| ivec.to_vec()))
            .map_err(|e| StorageError::Read {
                namespace: self.namespace.clone(),
                source: e.into(),
            })
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.db.insert(key, value).map(|_| ()).map_err(|e| StorageError::Write {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.db.remove(key).map(|_| ()).map_err(|e| StorageError::Delete {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }

    fn iter(&self) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        Ok(Box::new(
            self.db
                .iter()
                .filter_map(Result::ok)
                .map(|(k, v)| (k.to_vec(), v.to_vec())),
        ))
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        Ok(Box::new(
            self.db
                .scan_prefix(prefix)
                .filter_map(Result::ok)
                .map(|(k, v)| (k.to_vec(), v.to_vec())),
        ))
    }

    fn close(&self) -> Result<(), StorageError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.db.flush().map(|_| ()).map_err(|e| StorageError::Close {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }
}
