//! Book metadata store abstraction and implementations for Shelf.
//!
//! This crate provides:
//! - Book records with opaque attributes and an optional inline payload
//! - Partial updates that can clear the inline payload alone
//! - Stores: in-memory and a single JSON document on disk

pub mod error;
pub mod json;
pub mod memory;
pub mod models;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use json::JsonFileStore;
pub use memory::MemoryMetadataStore;
pub use models::{BookRecord, FieldUpdate, RESERVED_ATTRIBUTES, RecordUpdate};
pub use store::MetadataStore;

use shelf_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    config.validate().map_err(MetadataError::Config)?;

    match config {
        MetadataConfig::Memory => Ok(Arc::new(MemoryMetadataStore::new())),
        MetadataConfig::Json { path } => {
            let store = JsonFileStore::open(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
