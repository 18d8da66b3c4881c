//! In-memory metadata store.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{BookRecord, RecordUpdate};
use crate::store::MetadataStore;
use async_trait::async_trait;
use shelf_core::AssetId;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Volatile metadata store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: RwLock<BTreeMap<AssetId, BookRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = BookRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn list_all(&self) -> MetadataResult<Vec<BookRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &AssetId) -> MetadataResult<Option<BookRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, record: BookRecord) -> MetadataResult<()> {
        record.validate()?;
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(&self, id: &AssetId, update: RecordUpdate) -> MetadataResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| MetadataError::NotFound(id.to_string()))?;
        record.apply(update)
    }

    async fn delete(&self, id: &AssetId) -> MetadataResult<()> {
        self.records.write().await.remove(id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
