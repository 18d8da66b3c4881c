//! Local filesystem asset store.

use crate::blocking::run_blocking;
use crate::error::{StorageError, StorageResult};
use crate::estimate::{DirectoryEstimator, UnsupportedEstimator};
use crate::handle::AssetHandle;
use crate::probe::HostProbe;
use crate::traits::{AssetStore, BlobWriter, CapabilityProbe, UsageEstimate, UsageEstimator};
use crate::writers::{DirectWriter, OffloadedWriter};
use async_trait::async_trait;
use bytes::Bytes;
use shelf_core::AssetId;
use shelf_core::config::StorageConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Asset store keeping one `<id>.epub` file per asset, flat in a private root.
///
/// Writes pick a path per call: the streaming [`DirectWriter`] when the probe
/// reports support for it, otherwise the [`OffloadedWriter`].
pub struct FilesystemAssetStore {
    root: PathBuf,
    probe: Arc<dyn CapabilityProbe>,
    direct: Arc<dyn BlobWriter>,
    offloaded: Arc<dyn BlobWriter>,
    estimator: Arc<dyn UsageEstimator>,
}

impl FilesystemAssetStore {
    /// Create a store rooted at `root` with default collaborators.
    ///
    /// The root is not created until the first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_parts(
            root,
            Arc::new(HostProbe::default()),
            Arc::new(DirectWriter::new()),
            Arc::new(OffloadedWriter::new()),
            Arc::new(DirectoryEstimator::new(
                shelf_core::config::UsageConfig::default().quota_bytes,
            )),
        )
    }

    /// Create a store from configuration.
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        config.validate().map_err(StorageError::Config)?;

        let estimator: Arc<dyn UsageEstimator> = if config.usage.enabled {
            Arc::new(DirectoryEstimator::new(config.usage.quota_bytes))
        } else {
            Arc::new(UnsupportedEstimator)
        };

        Ok(Self::with_parts(
            &config.root,
            Arc::new(HostProbe::new(config.write_strategy)),
            Arc::new(DirectWriter::new()),
            Arc::new(OffloadedWriter::new()),
            estimator,
        ))
    }

    /// Create a store with explicit collaborators.
    pub fn with_parts(
        root: impl AsRef<Path>,
        probe: Arc<dyn CapabilityProbe>,
        direct: Arc<dyn BlobWriter>,
        offloaded: Arc<dyn BlobWriter>,
        estimator: Arc<dyn UsageEstimator>,
    ) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            probe,
            direct,
            offloaded,
            estimator,
        }
    }

    /// Root directory holding the assets.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn select_writer(&self, handle: &AssetHandle) -> &dyn BlobWriter {
        if self.probe.supports_streaming_write(handle) {
            self.direct.as_ref()
        } else {
            self.offloaded.as_ref()
        }
    }
}

#[async_trait]
impl AssetStore for FilesystemAssetStore {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn save(&self, id: &AssetId, data: Bytes) -> StorageResult<()> {
        let handle = AssetHandle::resolve(&self.root, id).await?;
        let writer = self.select_writer(&handle);
        tracing::debug!(writer = writer.name(), "saving asset");
        writer.write_all(&handle, data).await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn read(&self, id: &AssetId) -> StorageResult<Bytes> {
        let handle = AssetHandle::resolve_existing_root(&self.root, id).await?;
        let data = run_blocking(move || {
            std::fs::read(handle.path()).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::NotFound(handle.id().to_string())
                } else {
                    StorageError::Read {
                        id: handle.id().to_string(),
                        source: e,
                    }
                }
            })
        })
        .await?;
        Ok(Bytes::from(data))
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, id: &AssetId) -> StorageResult<()> {
        let handle = AssetHandle::resolve_existing_root(&self.root, id).await?;
        run_blocking(move || match std::fs::remove_file(handle.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(id = %handle.id(), "asset already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::Delete {
                id: handle.id().to_string(),
                source: e,
            }),
        })
        .await
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn estimate_usage(&self) -> UsageEstimate {
        self.estimator.estimate(&self.root).await.unwrap_or_default()
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
