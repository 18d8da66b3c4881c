//! Local asset storage for Shelf.
//!
//! This crate provides:
//! - A flat, one-file-per-asset store with full-replacement writes
//! - Two write paths chosen per call by a capability probe:
//!   streaming writes that commit on close, and blocking writes offloaded to a
//!   dedicated worker thread
//! - Best-effort usage estimation

pub mod backends;
mod blocking;
pub mod error;
pub mod estimate;
pub mod handle;
pub mod probe;
pub mod traits;
pub mod writers;

pub use backends::filesystem::FilesystemAssetStore;
pub use error::{StorageError, StorageResult};
pub use estimate::{DirectoryEstimator, UnsupportedEstimator};
pub use handle::AssetHandle;
pub use probe::HostProbe;
pub use traits::{AssetStore, BlobWriter, CapabilityProbe, UsageEstimate, UsageEstimator};
pub use writers::{DirectWriter, OffloadedWriter};

use shelf_core::config::StorageConfig;
use std::sync::Arc;

/// Create an asset store from configuration.
pub fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn AssetStore>> {
    let store = FilesystemAssetStore::from_config(config)?;
    tracing::debug!(
        root = %store.root().display(),
        strategy = ?config.write_strategy,
        "asset store configured"
    );
    Ok(Arc::new(store))
}
