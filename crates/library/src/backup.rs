//! Whole-library backup and restore.
//!
//! A backup is a JSON array of book records, each carrying its content inline
//! as base64 under `data`, which is the same shape the metadata store uses for
//! unmigrated records.

use crate::books::{import_book, load_book_content};
use crate::error::{LibraryError, LibraryResult};
use serde::Serialize;
use shelf_metadata::{BookRecord, MetadataStore};
use shelf_storage::AssetStore;
use tracing::instrument;

/// Outcome of a restore.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub restored: usize,
    /// Entries without content.
    pub skipped: usize,
}

/// Serialize every book, with content, into a backup document.
///
/// Books whose content cannot be found are left out with a warning.
#[instrument(skip_all)]
pub async fn export_backup(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
) -> LibraryResult<Vec<u8>> {
    let records = metadata.list_all().await?;
    let mut entries = Vec::with_capacity(records.len());

    for mut record in records {
        if record.inline_payload.is_none() {
            match load_book_content(metadata, assets, &record.id).await {
                Ok(content) => record.inline_payload = Some(content),
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "leaving book without content out of backup");
                    continue;
                }
            }
        }
        entries.push(record);
    }

    tracing::info!(books = entries.len(), "library backup created");
    serde_json::to_vec(&entries).map_err(|e| LibraryError::Backup(e.to_string()))
}

/// Restore books from a backup document.
///
/// Content goes to the asset store and records are written without inline
/// payloads. Existing books with the same id are replaced.
#[instrument(skip_all, fields(size = document.len()))]
pub async fn restore_backup(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
    document: &[u8],
) -> LibraryResult<RestoreReport> {
    let entries: Vec<BookRecord> =
        serde_json::from_slice(document).map_err(|e| LibraryError::Backup(e.to_string()))?;
    let mut report = RestoreReport::default();

    for mut entry in entries {
        let Some(content) = entry.inline_payload.take() else {
            tracing::warn!(id = %entry.id, "backup entry has no content, skipping");
            report.skipped += 1;
            continue;
        };
        import_book(metadata, assets, entry, content).await?;
        report.restored += 1;
    }

    tracing::info!(
        restored = report.restored,
        skipped = report.skipped,
        "library restored from backup"
    );
    Ok(report)
}
