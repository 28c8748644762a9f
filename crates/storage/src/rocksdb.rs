use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use ledgerdb_errors::StorageError;
use rocksdb::{DBCompressionType, DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options};

use crate::{
    config::{Compression, NamespaceConfig},
    store::{KeyValueStore, KvIterator, Value},
};

type RocksDb = DBWithThreadMode<MultiThreaded>;

/// RocksDB-backed namespace store. Writes go through the write-ahead log
/// by default, so a successful `put` survives a process crash.
pub struct RocksDbStore {
    namespace: String,
    connection: Arc<RocksDb>,
    closed: AtomicBool,
}

impl RocksDbStore {
    /// Opens (or creates) the database directory named by the config.
    pub fn open(config: &NamespaceConfig) -> Result<Self, StorageError> {
        let mut opts = Options::default();
        opts.create_if_missing(config.options.create_if_missing.unwrap_or(true));
        if let Some(bytes) = config.options.write_buffer_size {
            opts.set_write_buffer_size(bytes);
        }
        if let Some(limit) = config.options.max_open_files {
            opts.set_max_open_files(limit);
        }
        if let Some(compression) = config.options.compression {
            opts.set_compression_type(match compression {
                Compression::None => DBCompressionType::None,
                Compression::Snappy => DBCompressionType::Snappy,
                Compression::Lz4 => DBCompressionType::Lz4,
                Compression::Zstd => DBCompressionType::Zstd,
            });
        }

        let db = RocksDb::open(&opts, &config.path).map_err(|e| StorageError::Open {
            namespace: config.name.clone(),
            source: e.into(),
        })?;

        Ok(Self {
            namespace: config.name.clone(),
            connection: Arc::new(db),
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

impl KeyValueStore for RocksDbStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, key: &[u8]) -> Result<Option<Value>, StorageError> {
        self.ensure_open()?;
        self.connection.get(key).map_err(|e| StorageError::Read {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.connection.put(key, value).map_err(|e| StorageError::Write {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.ensure_open()?;
        self.connection.delete(key).map_err(|e| StorageError::Delete {
            namespace: self.namespace.clone(),
            source: e.into(),
        })
    }

    fn iter(&self) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        // RocksDB iterators pin a snapshot at creation.
        let iter = self.connection.iterator(IteratorMode::Start);
        Ok(Box::new(
            iter.filter_map(Result::ok).map(|(k, v)| (k.into_vec(), v.into_vec())),
        ))
    }

    fn iter_prefix(&self, prefix: &[u8]) -> Result<KvIterator<'_>, StorageError> {
        self.ensure_open()?;
        // Seek + bounded scan instead of prefix_iterator: correct without
        // a prefix extractor configured on the database.
        let iter = self.connection.iterator(IteratorMode::From(prefix, Direction::Forward));
        let prefix = prefix.to_vec();
        Ok(Box::new(
            iter.filter_map(Result::ok)
                .take_while(move |(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| (k.into_vec(), v.into_vec())),
        ))
    }

    fn close(&self) -> Result<(), StorageError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.connection.flush().map_err(|e| StorageError::Close {
            namespace: self.namespace.clone(),
            source: e.into(),
        })?;
        self.connection.cancel_all_background_work(true);
        Ok(())
    }
}
