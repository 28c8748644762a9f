pub mod config;
pub mod inmemory;
pub mod manager;
pub mod registry;
pub mod rocksdb;
pub mod sled;
pub mod store;

#[cfg(test)]
mod tests;

pub use crate::{
    config::{BackendKind, Compression, NamespaceConfig, NamespaceSettings, StorageSettings, TuningOptions},
    manager::{CloseReport, StorageManager},
    registry::{BackendFactory, StorageBackendRegistry},
    store::{Key, KeyValueStore, KvIterator, Value},
};
