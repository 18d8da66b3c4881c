//! Library error types.

use shelf_metadata::MetadataError;
use shelf_storage::StorageError;
use thiserror::Error;

/// Errors from library-level operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("book not found: {0}")]
    BookNotFound(String),

    #[error("book content not found: {0}")]
    ContentMissing(String),

    #[error("invalid backup: {0}")]
    Backup(String),

    #[error(transparent)]
    Core(#[from] shelf_core::Error),
}

/// Result type for library operations.
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
