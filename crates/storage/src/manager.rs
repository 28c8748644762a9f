use std::sync::Arc;

use ledgerdb_errors::StorageError;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{
    config::{NamespaceConfig, StorageSettings},
    registry::StorageBackendRegistry,
    store::KeyValueStore,
};

struct OpenNamespace {
    config: NamespaceConfig,
    store: Arc<dyn KeyValueStore>,
}

/// Outcome of [`StorageManager::close_all`]: which namespaces closed
/// cleanly and which failed, in open order.
#[derive(Default)]
pub struct CloseReport {
    pub closed: Vec<String>,
    pub failed: Vec<(String, StorageError)>,
}

impl CloseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the set of open stores for a process, keyed by logical
/// namespace. All table access is serialized, so concurrent opens of the
/// same name resolve deterministically: one call opens, the other gets
/// the existing handle or a conflict error.
pub struct StorageManager {
    registry: StorageBackendRegistry,
    // Insertion order doubles as close order; the table holds a handful
    // of namespaces, so linear scans are fine.
    namespaces: RwLock<Vec<OpenNamespace>>,
}

impl StorageManager {
    pub fn new(registry: StorageBackendRegistry) -> Self {
        Self {
            registry,
            namespaces: RwLock::new(Vec::new()),
        }
    }

    /// Opens the namespace, or returns the existing handle when it is
    /// already open under an identical config. A differing config for an
    /// open name fails with [`StorageError::NamespaceConflict`]; a
    /// backend failure leaves the manager unchanged.
    pub fn open(&self, config: &NamespaceConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        let mut table = self.namespaces.write();
        if let Some(existing) = table.iter().find(|ns| ns.config.name == config.name) {
            if existing.config == *config {
                return Ok(existing.store.clone());
            }
            return Err(StorageError::NamespaceConflict(config.name.clone()));
        }

        let store = self.registry.create(config)?;
        info!(namespace = %config.name, backend = %config.backend, "opened storage namespace");
        table.push(OpenNamespace {
            config: config.clone(),
            store: store.clone(),
        });
        Ok(store)
    }

    /// Opens every namespace in the settings, eagerly, in declaration
    /// order. The first failure aborts and names the failing namespace.
    pub fn open_all(&self, settings: &StorageSettings) -> Result<(), StorageError> {
        for config in settings.namespace_configs() {
            self.open(&config)?;
        }
        Ok(())
    }

    /// Handle for an open namespace.
    pub fn get(&self, name: &str) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        self.namespaces
            .read()
            .iter()
            .find(|ns| ns.config.name == name)
            .map(|ns| ns.store.clone())
            .ok_or_else(|| StorageError::NamespaceNotFound(name.to_string()))
    }

    /// Open namespace names, in open order.
    pub fn names(&self) -> Vec<String> {
        self.namespaces.read().iter().map(|ns| ns.config.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.read().is_empty()
    }

    /// Closes and removes a single namespace. The entry is removed even
    /// when the close fails, so a fresh `open` stays possible; the close
    /// failure is propagated.
    pub fn close_one(&self, name: &str) -> Result<(), StorageError> {
        let removed = {
            let mut table = self.namespaces.write();
            let index = table
                .iter()
                .position(|ns| ns.config.name == name)
                .ok_or_else(|| StorageError::NamespaceNotFound(name.to_string()))?;
            table.remove(index)
        };
        info!(namespace = %name, "closing storage namespace");
        removed.store.close()
    }

    /// Closes every open namespace, collecting per-namespace failures
    /// instead of aborting early. The manager is empty afterwards
    /// regardless of failures.
    pub fn close_all(&self) -> CloseReport {
        let drained: Vec<OpenNamespace> = {
            let mut table = self.namespaces.write();
            table.drain(..).collect()
        };

        let mut report = CloseReport::default();
        for ns in drained {
            let name = ns.config.name;
            match ns.store.close() {
                Ok(()) => {
                    info!(namespace = %name, "closed storage namespace");
                    report.closed.push(name);
                }
                Err(e) => {
                    warn!(namespace = %name, error = %e, "failed to close storage namespace");
                    report.failed.push((name, e));
                }
            }
        }
        report
    }
}
