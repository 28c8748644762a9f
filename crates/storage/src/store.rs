use ledgerdb_errors::StorageError;

pub type Key = Vec<u8>;
pub type Value = Vec<u8>;

/// Lazy key-ordered stream of entries, borrowed from the store that
/// produced it.
pub type KvIterator<'a> = Box<dyn Iterator<Item = (Key, Value)> + 'a>;

/// Capability contract every storage backend satisfies.
///
/// One instance corresponds to one open namespace. Handles are owned by
/// the [`StorageManager`](crate::manager::StorageManager) and cloned out
/// to consumers as `Arc<dyn KeyValueStore>`; consumers must not call any
/// operation concurrently with [`close`](KeyValueStore::close) on the
/// same handle — quiescence before close is a caller obligation.
///
/// Durability of a successful `put` follows the backend's policy:
/// RocksDB write-ahead-logs by default, sled flushes periodically
/// (tunable via `flush_every_ms`), the in-memory backend persists
/// nothing.
pub trait KeyValueStore: Send + Sync {
    /// Namespace this store was opened for.
    fn namespace(&self) -> &str;

    /// Point read. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &[u8]) -> Result<Option<Value>, StorageError>;

    /// Upsert.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Removes the key if present; absence is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// All entries in backend-native key order.
    ///
    /// Entries whose backend read fails are skipped. RocksDB and the
    /// in-memory backend iterate a snapshot taken at call time; sled
    /// iteration may observe concurrent mutations.
    fn iter(&self) -> Result<KvIterator<'_>, StorageError>;

    /// Entries whose key starts with `prefix`, in key order.
    fn iter_prefix(&self, prefix: &[u8]) -> Result<KvIterator<'_>, StorageError>;

    /// Releases backend resources. Idempotent: closing twice is a no-op.
    /// Every other operation on a closed store fails with
    /// [`StorageError::StoreClosed`].
    fn close(&self) -> Result<(), StorageError>;
}
