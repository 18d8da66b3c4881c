//! Storage trait definitions.

use crate::error::StorageResult;
use crate::handle::AssetHandle;
use async_trait::async_trait;
use bytes::Bytes;
use shelf_core::AssetId;

/// Best-effort storage consumption report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsageEstimate {
    /// Bytes currently consumed under the store root.
    pub used_bytes: u64,
    /// Bytes the store may grow to.
    pub quota_bytes: u64,
}

/// Persistent blob store keyed by asset id.
///
/// Each asset is a single file written with full-replacement semantics.
/// The store keeps no index of known ids; the metadata store is the source of
/// truth for which assets should exist.
///
/// Concurrent `save` calls for the same id are not serialized. Callers that may
/// write the same id from several tasks must order those writes themselves.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Replace the full content of an asset, creating it if absent.
    async fn save(&self, id: &AssetId, data: Bytes) -> StorageResult<()>;

    /// Read the full content of an asset.
    ///
    /// Fails with [`StorageError::NotFound`](crate::StorageError::NotFound) when
    /// the asset does not exist.
    async fn read(&self, id: &AssetId) -> StorageResult<Bytes>;

    /// Ensure an asset is absent. Deleting a missing asset succeeds.
    async fn delete(&self, id: &AssetId) -> StorageResult<()>;

    /// Estimate storage consumption. Returns `{0, 0}` when unsupported.
    async fn estimate_usage(&self) -> UsageEstimate;

    /// Get the name of this storage backend.
    ///
    /// Used for logging.
    fn backend_name(&self) -> &'static str;
}

/// Writes an entire payload to an asset file.
///
/// Implementations differ in how the bytes reach the disk; all of them leave the
/// file holding exactly `data` on success.
#[async_trait]
pub trait BlobWriter: Send + Sync + 'static {
    /// Replace the content behind `handle` with `data`.
    async fn write_all(&self, handle: &AssetHandle, data: Bytes) -> StorageResult<()>;

    /// Short name of the write path, for logging.
    fn name(&self) -> &'static str;
}

/// Decides per handle whether the streaming write path can be used.
pub trait CapabilityProbe: Send + Sync + 'static {
    /// Whether `handle` supports an open → write → close streaming sequence.
    fn supports_streaming_write(&self, handle: &AssetHandle) -> bool;
}

/// Source of storage usage figures.
#[async_trait]
pub trait UsageEstimator: Send + Sync + 'static {
    /// Estimate usage under `root`, or `None` when no estimate is available.
    async fn estimate(&self, root: &std::path::Path) -> Option<UsageEstimate>;
}
