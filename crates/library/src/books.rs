//! Book-level operations spanning both stores.
//!
//! The metadata store and the asset store share no transaction. Each operation
//! orders its steps so that an interruption leaves state the next call can
//! repair or the fallback read can still serve.

use crate::error::{LibraryError, LibraryResult};
use bytes::Bytes;
use shelf_core::AssetId;
use shelf_metadata::{BookRecord, MetadataStore};
use shelf_storage::AssetStore;
use tracing::instrument;

/// Load a book's content.
///
/// Reads the asset first. If it is missing, the record may not be migrated yet,
/// so its inline payload is used. If the record has no payload either, a
/// concurrent migration may have just moved it, so the asset is read once more
/// before reporting [`LibraryError::ContentMissing`].
#[instrument(skip(metadata, assets))]
pub async fn load_book_content(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
    id: &AssetId,
) -> LibraryResult<Bytes> {
    match assets.read(id).await {
        Ok(data) => return Ok(data),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    match metadata.get(id).await? {
        Some(BookRecord {
            inline_payload: Some(payload),
            ..
        }) => {
            tracing::debug!("serving inline payload");
            return Ok(payload);
        }
        Some(_) => {}
        None => return Err(LibraryError::ContentMissing(id.to_string())),
    }

    match assets.read(id).await {
        Ok(data) => Ok(data),
        Err(e) if e.is_not_found() => Err(LibraryError::ContentMissing(id.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Add a book: content to the asset store, then the record.
///
/// Any inline payload on `record` is dropped; content always lives in the asset
/// store. If the record cannot be written, the asset is removed again.
#[instrument(skip(metadata, assets, record, content), fields(id = %record.id, size = content.len()))]
pub async fn import_book(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
    mut record: BookRecord,
    content: Bytes,
) -> LibraryResult<()> {
    record.inline_payload = None;
    let id = record.id.clone();

    assets.save(&id, content).await?;

    if let Err(e) = metadata.put(record).await {
        if let Err(cleanup) = assets.delete(&id).await {
            tracing::warn!(id = %id, error = %cleanup, "failed to remove asset of rejected import");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Remove a book: asset first, then the record.
///
/// Both steps are idempotent, so a failed removal can simply be retried.
#[instrument(skip(metadata, assets))]
pub async fn delete_book(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
    id: &AssetId,
) -> LibraryResult<()> {
    assets.delete(id).await?;
    metadata.delete(id).await?;
    Ok(())
}

/// Remove every book, returning how many were removed.
///
/// Stops at the first failure. Books already removed stay removed, so the call
/// can simply be repeated.
#[instrument(skip_all)]
pub async fn clear_library(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
) -> LibraryResult<usize> {
    let records = metadata.list_all().await?;
    let total = records.len();
    for record in records {
        delete_book(metadata, assets, &record.id).await?;
    }
    tracing::info!(removed = total, "library cleared");
    Ok(total)
}
