use std::{collections::HashMap, sync::Arc};

use ledgerdb_errors::StorageError;
use tracing::debug;

use crate::{
    config::{BackendKind, NamespaceConfig},
    inmemory::InMemoryStore,
    rocksdb::RocksDbStore,
    sled::SledStore,
    store::KeyValueStore,
};

/// Constructor for one backend kind: builds an open store from a
/// validated namespace descriptor.
pub type BackendFactory =
    Box<dyn Fn(&NamespaceConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> + Send + Sync>;

/// Maps backend kinds to store factories, decoupling namespace
/// configuration from concrete engines.
#[derive(Default)]
pub struct StorageBackendRegistry {
    factories: HashMap<BackendKind, BackendFactory>,
}

impl StorageBackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three built-in backends pre-registered.
    pub fn with_default_backends() -> Self {
        let mut registry = Self::new();
        let built_ins: [(BackendKind, BackendFactory); 3] = [
            (
                BackendKind::RocksDb,
                Box::new(|config: &NamespaceConfig| {
                    let store: Arc<dyn KeyValueStore> = Arc::new(RocksDbStore::open(config)?);
                    Ok(store)
                }),
            ),
            (
                BackendKind::Sled,
                Box::new(|config: &NamespaceConfig| {
                    let store: Arc<dyn KeyValueStore> = Arc::new(SledStore::open(config)?);
                    Ok(store)
                }),
            ),
            (
                BackendKind::Memory,
                Box::new(|config: &NamespaceConfig| {
                    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new(&config.name));
                    Ok(store)
                }),
            ),
        ];
        for (kind, factory) in built_ins {
            registry.factories.insert(kind, factory);
        }
        registry
    }

    /// Associates a backend kind with its factory. Registering the same
    /// kind twice is a configuration bug and always fails; overwriting
    /// is not supported.
    pub fn register(
        &mut self,
        kind: BackendKind,
        factory: BackendFactory,
    ) -> Result<(), StorageError> {
        if self.factories.contains_key(&kind) {
            return Err(StorageError::DuplicateBackend(kind.to_string()));
        }
        self.factories.insert(kind, factory);
        Ok(())
    }

    pub fn contains(&self, kind: BackendKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Validates the descriptor, then invokes the matching factory. This
    /// is where the underlying database is opened or created on disk.
    pub fn create(&self, config: &NamespaceConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        config.validate()?;
        let factory = self
            .factories
            .get(&config.backend)
            .ok_or_else(|| StorageError::UnknownBackend(config.backend.to_string()))?;
        debug!(namespace = %config.name, backend = %config.backend, "creating store");
        factory(config)
    }
}
