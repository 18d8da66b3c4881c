use async_trait::async_trait;
use bytes::Bytes;
use shelf_core::AssetId;
use shelf_metadata::{
    BookRecord, MemoryMetadataStore, MetadataError, MetadataResult, MetadataStore, RecordUpdate,
};
use shelf_storage::{AssetStore, StorageError, StorageResult, UsageEstimate};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a record carrying inline content.
#[allow(dead_code)]
pub fn book_with_payload(id: &str, payload: &[u8]) -> BookRecord {
    BookRecord::new(AssetId::new(id).unwrap())
        .with_attribute("title", format!("Title of {id}"))
        .with_attribute("author", "Unknown")
        .with_inline_payload(Bytes::copy_from_slice(payload))
}

/// In-memory asset store that counts writes and reads. It can be told to fail
/// saves for chosen ids, or to report an id missing for its next few reads.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: Mutex<BTreeMap<AssetId, Bytes>>,
    fail_saves: Mutex<HashSet<String>>,
    missed_reads: Mutex<HashMap<String, usize>>,
    pub saves: Arc<AtomicUsize>,
    pub reads: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MemoryAssetStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_saves_for(&self, id: &str) {
        self.fail_saves.lock().unwrap().insert(id.to_string());
    }

    pub fn stop_failing(&self, id: &str) {
        self.fail_saves.lock().unwrap().remove(id);
    }

    /// Answer `NotFound` for the next `count` reads of `id`, even if stored.
    pub fn miss_reads_for(&self, id: &str, count: usize) {
        self.missed_reads
            .lock()
            .unwrap()
            .insert(id.to_string(), count);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<Bytes> {
        self.assets
            .lock()
            .unwrap()
            .get(&AssetId::new(id).unwrap())
            .cloned()
    }

    pub fn insert(&self, id: &str, data: &[u8]) {
        self.assets
            .lock()
            .unwrap()
            .insert(AssetId::new(id).unwrap(), Bytes::copy_from_slice(data));
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn save(&self, id: &AssetId, data: Bytes) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.lock().unwrap().contains(id.as_str()) {
            return Err(StorageError::Write {
                id: id.to_string(),
                source: std::io::Error::other("quota exceeded"),
            });
        }
        self.assets.lock().unwrap().insert(id.clone(), data);
        Ok(())
    }

    async fn read(&self, id: &AssetId) -> StorageResult<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(remaining) = self.missed_reads.lock().unwrap().get_mut(id.as_str())
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.assets
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &AssetId) -> StorageResult<()> {
        self.assets.lock().unwrap().remove(id);
        Ok(())
    }

    async fn estimate_usage(&self) -> UsageEstimate {
        let used_bytes = self
            .assets
            .lock()
            .unwrap()
            .values()
            .map(|data| data.len() as u64)
            .sum();
        UsageEstimate {
            used_bytes,
            quota_bytes: 1024 * 1024 * 1024,
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Metadata store wrapper whose `update`/`put` can be made to fail per id.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingMetadataStore {
    inner: MemoryMetadataStore,
    fail_updates: Mutex<HashSet<String>>,
    fail_puts: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl FailingMetadataStore {
    pub fn with_records(records: impl IntoIterator<Item = BookRecord>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryMetadataStore::with_records(records),
            ..Self::default()
        })
    }

    pub fn fail_updates_for(&self, id: &str) {
        self.fail_updates.lock().unwrap().insert(id.to_string());
    }

    pub fn stop_failing_updates(&self, id: &str) {
        self.fail_updates.lock().unwrap().remove(id);
    }

    pub fn fail_puts_for(&self, id: &str) {
        self.fail_puts.lock().unwrap().insert(id.to_string());
    }
}

#[async_trait]
impl MetadataStore for FailingMetadataStore {
    async fn list_all(&self) -> MetadataResult<Vec<BookRecord>> {
        self.inner.list_all().await
    }

    async fn get(&self, id: &AssetId) -> MetadataResult<Option<BookRecord>> {
        self.inner.get(id).await
    }

    async fn put(&self, record: BookRecord) -> MetadataResult<()> {
        if self.fail_puts.lock().unwrap().contains(record.id.as_str()) {
            return Err(MetadataError::Io(std::io::Error::other("disk full")));
        }
        self.inner.put(record).await
    }

    async fn update(&self, id: &AssetId, update: RecordUpdate) -> MetadataResult<()> {
        if self.fail_updates.lock().unwrap().contains(id.as_str()) {
            return Err(MetadataError::Io(std::io::Error::other(
                "document is read-only",
            )));
        }
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: &AssetId) -> MetadataResult<()> {
        self.inner.delete(id).await
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
