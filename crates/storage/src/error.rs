//! Storage error types.

use thiserror::Error;

/// Asset store operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to write asset {id}: {source}")]
    Write {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("offloaded write of asset {id} failed: {message}")]
    Worker { id: String, message: String },

    #[error("failed to read asset {id}: {source}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete asset {id}: {source}")]
    Delete {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether this error means the asset does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }

    pub(crate) fn write(id: &shelf_core::AssetId, source: std::io::Error) -> Self {
        StorageError::Write {
            id: id.to_string(),
            source,
        }
    }

    pub(crate) fn worker(id: &shelf_core::AssetId, message: impl Into<String>) -> Self {
        StorageError::Worker {
            id: id.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
