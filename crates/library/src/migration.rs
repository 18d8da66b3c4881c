//! Relocation of inline payloads into the asset store.
//!
//! Records written before the asset store existed embed their book content.
//! The sweep moves each payload in two steps:
//!
//! 1. Write the payload to the asset store.
//! 2. Only after that succeeds, clear the payload from the record.
//!
//! A crash between the steps leaves the payload in both places, and the next
//! sweep simply writes the asset again. The presence of an inline payload is
//! the only gate, so completed records are skipped without any I/O and the
//! sweep is safe to run on every startup.

use crate::error::LibraryResult;
use serde::Serialize;
use shelf_metadata::{MetadataStore, RecordUpdate};
use shelf_storage::AssetStore;
use tracing::instrument;

/// Outcome of one migration sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Records whose payload moved to the asset store in this sweep.
    pub migrated: usize,
    /// Records left untouched because a step failed; retried next sweep.
    pub failed: usize,
    /// Records with no inline payload.
    pub skipped: usize,
}

/// Move every inline payload into `assets` and clear it from its record.
///
/// Per-record failures are logged and counted, never fatal. Only a failure to
/// list the records aborts the sweep.
#[instrument(skip_all, fields(metadata = metadata.backend_name(), assets = assets.backend_name()))]
pub async fn migrate(
    metadata: &dyn MetadataStore,
    assets: &dyn AssetStore,
) -> LibraryResult<MigrationReport> {
    let records = metadata.list_all().await?;
    let mut report = MigrationReport::default();

    for record in records {
        let Some(payload) = record.inline_payload else {
            report.skipped += 1;
            continue;
        };
        let id = record.id;
        let size = payload.len();

        if let Err(e) = assets.save(&id, payload).await {
            tracing::error!(id = %id, size, error = %e, "failed to move inline payload to asset store");
            report.failed += 1;
            continue;
        }

        // The asset is durable now; if this update fails the next sweep
        // rewrites the same bytes and tries again.
        if let Err(e) = metadata
            .update(&id, RecordUpdate::clear_inline_payload())
            .await
        {
            tracing::error!(id = %id, error = %e, "asset saved but inline payload could not be cleared");
            report.failed += 1;
            continue;
        }

        tracing::debug!(id = %id, size, "migrated inline payload");
        report.migrated += 1;
    }

    if report.migrated > 0 {
        tracing::info!(
            migrated = report.migrated,
            failed = report.failed,
            "moved inline book payloads to asset store"
        );
    } else if report.failed > 0 {
        tracing::warn!(failed = report.failed, "inline payload migration made no progress");
    }

    Ok(report)
}
