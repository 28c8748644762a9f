use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Errors surfaced by the namespace storage layer.
///
/// Every variant that originates inside a backend carries the namespace
/// name, so failures can be diagnosed from the error alone.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("backend '{0}' is not registered")]
    UnknownBackend(String),
    #[error("backend '{0}' is already registered")]
    DuplicateBackend(String),
    #[error("namespace '{0}' is already open with a different configuration")]
    NamespaceConflict(String),
    #[error("namespace '{0}' is not open")]
    NamespaceNotFound(String),
    #[error("invalid configuration for namespace '{namespace}': {reason}")]
    InvalidConfig { namespace: String, reason: String },
    #[error("opening namespace '{namespace}': {source}")]
    Open {
        namespace: String,
        #[source]
        source: AnyhowError,
    },
    #[error("reading from namespace '{namespace}': {source}")]
    Read {
        namespace: String,
        #[source]
        source: AnyhowError,
    },
    #[error("writing to namespace '{namespace}': {source}")]
    Write {
        namespace: String,
        #[source]
        source: AnyhowError,
    },
    #[error("deleting from namespace '{namespace}': {source}")]
    Delete {
        namespace: String,
        #[source]
        source: AnyhowError,
    },
    #[error("closing namespace '{namespace}': {source}")]
    Close {
        namespace: String,
        #[source]
        source: AnyhowError,
    },
    #[error("store for namespace '{0}' is closed")]
    StoreClosed(String),
}

impl StorageError {
    /// Namespace the error refers to, when one is known.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            StorageError::NamespaceConflict(ns)
            | StorageError::NamespaceNotFound(ns)
            | StorageError::StoreClosed(ns) => Some(ns),
            StorageError::InvalidConfig { namespace, .. }
            | StorageError::Open { namespace, .. }
            | StorageError::Read { namespace, .. }
            | StorageError::Write { namespace, .. }
            | StorageError::Delete { namespace, .. }
            | StorageError::Close { namespace, .. } => Some(namespace),
            StorageError::UnknownBackend(_) | StorageError::DuplicateBackend(_) => None,
        }
    }
}

/// Errors produced while loading the node's storage settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("reading settings: {0}")]
    SourceError(String),
    #[error("parsing settings: {0}")]
    ParsingError(String),
    #[error("duplicate namespace '{0}' in settings")]
    DuplicateNamespace(String),
}
