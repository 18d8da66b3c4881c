//! Library orchestration for Shelf.
//!
//! Operations here span the metadata store and the asset store:
//! - One-shot, repeatable migration of inline payloads into the asset store
//! - Content loading with fallback to unmigrated inline payloads
//! - Import and removal of books, one at a time or all at once
//! - Whole-library backup and restore

pub mod backup;
pub mod books;
pub mod error;
pub mod library;
pub mod migration;

pub use backup::{RestoreReport, export_backup, restore_backup};
pub use books::{clear_library, delete_book, import_book, load_book_content};
pub use error::{LibraryError, LibraryResult};
pub use library::Library;
pub use migration::{MigrationReport, migrate};
