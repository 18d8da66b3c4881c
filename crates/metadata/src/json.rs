//! Metadata store persisted as a single JSON document.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{BookRecord, RecordUpdate};
use crate::store::MetadataStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shelf_core::AssetId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

const DOCUMENT_VERSION: u32 = 1;

/// On-disk layout.
#[derive(Serialize, Deserialize)]
struct Document {
    version: u32,
    books: Vec<BookRecord>,
}

/// Metadata store backed by one JSON file.
///
/// The whole document is rewritten on every mutation through a temp file,
/// fsync and rename, so a crash leaves either the old or the new document.
/// Inline payloads are stored base64-encoded.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<AssetId, BookRecord>>,
}

impl JsonFileStore {
    /// Open the document at `path`, starting empty if it does not exist.
    pub async fn open(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read(&path).await {
            Ok(raw) => {
                let document: Document = serde_json::from_slice(&raw)?;
                if document.version != DOCUMENT_VERSION {
                    return Err(MetadataError::Config(format!(
                        "unsupported metadata document version {} in {}",
                        document.version,
                        path.display()
                    )));
                }
                document
                    .books
                    .into_iter()
                    .map(|record| (record.id.clone(), record))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(MetadataError::Io(e)),
        };

        tracing::debug!(path = %path.display(), records = records.len(), "opened metadata document");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate` to a copy of the records, persist it, then publish it.
    ///
    /// The in-memory view only changes once the document is on disk.
    async fn mutate<T>(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<AssetId, BookRecord>) -> MetadataResult<T>,
    ) -> MetadataResult<T> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        let out = mutate(&mut next)?;
        self.persist(&next).await?;
        *records = next;
        Ok(out)
    }

    async fn persist(&self, records: &BTreeMap<AssetId, BookRecord>) -> MetadataResult<()> {
        let document = Document {
            version: DOCUMENT_VERSION,
            books: records.values().cloned().collect(),
        };
        let raw = serde_json::to_vec_pretty(&document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let temp_name = format!(".tmp.{}", Uuid::new_v4());
        let temp_path = self.path.with_file_name(
            self.path
                .file_name()
                .map(|n| format!("{}{}", n.to_string_lossy(), temp_name))
                .unwrap_or_else(|| temp_name.clone()),
        );

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&raw).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(MetadataError::Io(e));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn list_all(&self) -> MetadataResult<Vec<BookRecord>> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn get(&self, id: &AssetId) -> MetadataResult<Option<BookRecord>> {
        Ok(self.records.lock().await.get(id).cloned())
    }

    #[instrument(skip(self, record), fields(backend = "json", id = %record.id))]
    async fn put(&self, record: BookRecord) -> MetadataResult<()> {
        record.validate()?;
        self.mutate(|records| {
            records.insert(record.id.clone(), record);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, update), fields(backend = "json"))]
    async fn update(&self, id: &AssetId, update: RecordUpdate) -> MetadataResult<()> {
        self.mutate(|records| {
            let record = records
                .get_mut(id)
                .ok_or_else(|| MetadataError::NotFound(id.to_string()))?;
            record.apply(update)
        })
        .await
    }

    #[instrument(skip(self), fields(backend = "json"))]
    async fn delete(&self, id: &AssetId) -> MetadataResult<()> {
        if !self.records.lock().await.contains_key(id) {
            return Ok(());
        }
        self.mutate(|records| {
            records.remove(id);
            Ok(())
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
