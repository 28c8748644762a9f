use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use config::{Config, File};
use ledgerdb_errors::{SettingsError, StorageError};
use serde::{Deserialize, Serialize};

/// The three namespaces every node opens at startup.
pub const CONFIG_STATE_DB: &str = "config_state";
pub const IDR_CACHE_DB: &str = "idr_cache_db";
pub const ATTR_DB: &str = "attr_db";

/// Storage engines the registry knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    RocksDb,
    Sled,
    Memory,
}

impl BackendKind {
    /// Whether the backend keeps state on disk and therefore needs a
    /// non-empty path.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, BackendKind::Memory)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::RocksDb => "rocksdb",
            BackendKind::Sled => "sled",
            BackendKind::Memory => "memory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    Snappy,
    Lz4,
    Zstd,
}

/// Optional per-namespace tuning, layered over each backend's defaults.
///
/// The manager and registry treat this as opaque; every backend applies
/// the fields it understands and ignores the rest. Unset fields keep the
/// backend default: RocksDB creates missing databases, write-ahead-logs,
/// and uses its stock buffer sizes; sled uses a 1 GiB cache and a 500 ms
/// flush interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningOptions {
    /// Create the database if absent (RocksDB; default true).
    pub create_if_missing: Option<bool>,
    /// Memtable size in bytes (RocksDB).
    pub write_buffer_size: Option<usize>,
    /// Open file-descriptor budget (RocksDB).
    pub max_open_files: Option<i32>,
    /// Block compression algorithm (RocksDB).
    pub compression: Option<Compression>,
    /// Page cache size in bytes (sled).
    pub cache_capacity: Option<u64>,
    /// Background flush interval (sled).
    pub flush_every_ms: Option<u64>,
}

impl TuningOptions {
    pub fn with_write_buffer_size(mut self, bytes: usize) -> Self {
        self.write_buffer_size = Some(bytes);
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = Some(bytes);
        self
    }
}

/// Declarative descriptor for one namespace: which engine, where on
/// disk, and how tuned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,
    pub backend: BackendKind,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub options: TuningOptions,
}

impl NamespaceConfig {
    pub fn new(name: impl Into<String>, backend: BackendKind) -> Self {
        Self {
            name: name.into(),
            backend,
            path: PathBuf::new(),
            options: TuningOptions::default(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_options(mut self, options: TuningOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks the descriptor before any backend I/O happens.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.name.is_empty() {
            return Err(StorageError::InvalidConfig {
                namespace: self.name.clone(),
                reason: "namespace name must not be empty".to_string(),
            });
        }
        if self.backend.is_persistent() && self.path.as_os_str().is_empty() {
            return Err(StorageError::InvalidConfig {
                namespace: self.name.clone(),
                reason: format!("backend '{}' requires a non-empty path", self.backend),
            });
        }
        Ok(())
    }
}

fn default_backend() -> BackendKind {
    BackendKind::RocksDb
}

/// One namespace entry in the node's settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSettings {
    pub name: String,
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    /// On-disk database directory name; defaults to the namespace name.
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub options: TuningOptions,
}

impl NamespaceSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: default_backend(),
            db_name: None,
            options: TuningOptions::default(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Node-level storage settings: a base directory plus the namespace
/// table. The default reproduces the stock node deployment — config
/// state, identity/role cache, and attribute store, all on RocksDB with
/// default tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub namespaces: Vec<NamespaceSettings>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            namespaces: vec![
                NamespaceSettings::new(CONFIG_STATE_DB),
                NamespaceSettings::new(IDR_CACHE_DB),
                NamespaceSettings::new(ATTR_DB),
            ],
        }
    }
}

impl StorageSettings {
    /// Loads settings from a TOML file, layered over [`Default`]. Keys
    /// absent from the file keep their default values; a `namespaces`
    /// table in the file replaces the default namespace list entirely.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let defaults = Config::try_from(&StorageSettings::default())
            .map_err(|e| SettingsError::SourceError(e.to_string()))?;
        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.to_path_buf()))
            .build()
            .map_err(|e| SettingsError::SourceError(e.to_string()))?;
        let settings: StorageSettings = config
            .try_deserialize()
            .map_err(|e| SettingsError::ParsingError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let mut seen = HashSet::new();
        for ns in &self.namespaces {
            if !seen.insert(ns.name.as_str()) {
                return Err(SettingsError::DuplicateNamespace(ns.name.clone()));
            }
        }
        Ok(())
    }

    /// Resolves every entry to an openable [`NamespaceConfig`], rooting
    /// persistent databases under `base_dir`.
    pub fn namespace_configs(&self) -> Vec<NamespaceConfig> {
        self.namespaces
            .iter()
            .map(|ns| {
                let path = if ns.backend.is_persistent() {
                    self.base_dir.join(ns.db_name.as_deref().unwrap_or(&ns.name))
                } else {
                    PathBuf::new()
                };
                NamespaceConfig {
                    name: ns.name.clone(),
                    backend: ns.backend,
                    path,
                    options: ns.options.clone(),
                }
            })
            .collect()
    }
}
