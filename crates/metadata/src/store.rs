//! Metadata store trait.

use crate::error::MetadataResult;
use crate::models::{BookRecord, RecordUpdate};
use async_trait::async_trait;
use shelf_core::AssetId;

/// Store of book records.
///
/// The metadata store is the source of truth for which books exist. It shares
/// no transaction with the asset store.
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// All records, in id order.
    async fn list_all(&self) -> MetadataResult<Vec<BookRecord>>;

    /// A single record, if present.
    async fn get(&self, id: &AssetId) -> MetadataResult<Option<BookRecord>>;

    /// Insert or replace a record.
    ///
    /// Fails with `ReservedAttribute` if an attribute is named like a record field.
    async fn put(&self, record: BookRecord) -> MetadataResult<()>;

    /// Apply a partial update. Fails with `NotFound` for unknown ids and with
    /// `ReservedAttribute` for updates naming a record field.
    async fn update(&self, id: &AssetId, update: RecordUpdate) -> MetadataResult<()>;

    /// Remove a record. Removing a missing record succeeds.
    async fn delete(&self, id: &AssetId) -> MetadataResult<()>;

    /// Get the name of this metadata backend.
    ///
    /// Used for logging.
    fn backend_name(&self) -> &'static str;
}
