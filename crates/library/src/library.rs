//! The library facade used by applications.

use crate::backup::{self, RestoreReport};
use crate::books;
use crate::error::{LibraryError, LibraryResult};
use crate::migration::{self, MigrationReport};
use bytes::Bytes;
use shelf_core::AssetId;
use shelf_core::config::AppConfig;
use shelf_metadata::{BookRecord, MetadataStore};
use shelf_storage::{AssetStore, UsageEstimate};
use std::sync::Arc;

/// A metadata store and an asset store used together.
#[derive(Clone)]
pub struct Library {
    metadata: Arc<dyn MetadataStore>,
    assets: Arc<dyn AssetStore>,
}

impl Library {
    pub fn new(metadata: Arc<dyn MetadataStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { metadata, assets }
    }

    /// Build both stores from configuration.
    ///
    /// Runs the inline payload migration first when
    /// `migration.run_on_startup` is set.
    pub async fn open(config: &AppConfig) -> LibraryResult<Self> {
        config.validate().map_err(shelf_core::Error::Config)?;

        let assets = shelf_storage::from_config(&config.storage)?;
        let metadata = shelf_metadata::from_config(&config.metadata).await?;
        let library = Self::new(metadata, assets);

        if config.migration.run_on_startup {
            library.migrate().await?;
        }
        Ok(library)
    }

    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    pub fn assets(&self) -> &Arc<dyn AssetStore> {
        &self.assets
    }

    /// See [`migration::migrate`].
    pub async fn migrate(&self) -> LibraryResult<MigrationReport> {
        migration::migrate(self.metadata.as_ref(), self.assets.as_ref()).await
    }

    /// See [`books::load_book_content`].
    pub async fn load_book_content(&self, id: &AssetId) -> LibraryResult<Bytes> {
        books::load_book_content(self.metadata.as_ref(), self.assets.as_ref(), id).await
    }

    /// See [`books::import_book`].
    pub async fn import_book(&self, record: BookRecord, content: Bytes) -> LibraryResult<()> {
        books::import_book(self.metadata.as_ref(), self.assets.as_ref(), record, content).await
    }

    /// See [`books::delete_book`].
    pub async fn delete_book(&self, id: &AssetId) -> LibraryResult<()> {
        books::delete_book(self.metadata.as_ref(), self.assets.as_ref(), id).await
    }

    /// See [`books::clear_library`].
    pub async fn clear(&self) -> LibraryResult<usize> {
        books::clear_library(self.metadata.as_ref(), self.assets.as_ref()).await
    }

    /// Look up a book record.
    pub async fn book(&self, id: &AssetId) -> LibraryResult<BookRecord> {
        self.metadata
            .get(id)
            .await?
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))
    }

    /// All book records.
    pub async fn books(&self) -> LibraryResult<Vec<BookRecord>> {
        Ok(self.metadata.list_all().await?)
    }

    /// Storage consumed by book content.
    pub async fn usage(&self) -> UsageEstimate {
        self.assets.estimate_usage().await
    }

    /// See [`backup::export_backup`].
    pub async fn export_backup(&self) -> LibraryResult<Vec<u8>> {
        backup::export_backup(self.metadata.as_ref(), self.assets.as_ref()).await
    }

    /// See [`backup::restore_backup`].
    pub async fn restore_backup(&self, document: &[u8]) -> LibraryResult<RestoreReport> {
        backup::restore_backup(self.metadata.as_ref(), self.assets.as_ref(), document).await
    }
}
