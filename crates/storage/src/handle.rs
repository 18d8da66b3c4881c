//! Resolved references to asset files.

use crate::blocking::run_blocking;
use crate::error::{StorageError, StorageResult};
use shelf_core::AssetId;
use std::path::{Path, PathBuf};

/// A resolved reference to the file holding one asset.
///
/// Obtaining a handle ensures the store root exists but does not create or
/// touch the asset file itself; the writer that consumes the handle does that.
#[derive(Clone, Debug)]
pub struct AssetHandle {
    id: AssetId,
    root: PathBuf,
    path: PathBuf,
}

impl AssetHandle {
    /// Resolve the handle for `id` under `root`, creating the root if needed.
    ///
    /// The root is re-resolved on every call so that a directory removed or
    /// re-permissioned at runtime is picked up without restarting.
    pub async fn resolve(root: &Path, id: &AssetId) -> StorageResult<Self> {
        Self::resolve_off_thread(root, id, true).await
    }

    /// Resolve the handle for `id` without creating the root.
    pub async fn resolve_existing_root(root: &Path, id: &AssetId) -> StorageResult<Self> {
        Self::resolve_off_thread(root, id, false).await
    }

    async fn resolve_off_thread(
        root: &Path,
        id: &AssetId,
        create_root: bool,
    ) -> StorageResult<Self> {
        let root = root.to_path_buf();
        let id = id.clone();
        run_blocking(move || Self::resolve_sync(&root, &id, create_root)).await
    }

    fn resolve_sync(root: &Path, id: &AssetId, create_root: bool) -> StorageResult<Self> {
        if create_root {
            std::fs::create_dir_all(root)?;
        }
        let path = root.join(id.file_name());

        // A symlink at the asset location could redirect reads and writes
        // outside the store root.
        match std::fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(StorageError::InvalidPath(format!(
                    "asset file is a symbolic link: {}",
                    path.display()
                )));
            }
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(StorageError::Io(err)),
        }

        Ok(Self {
            id: id.clone(),
            root: root.to_path_buf(),
            path,
        })
    }

    /// Build a handle without touching the filesystem.
    ///
    /// Used by the offloaded worker, which re-derives its own handle rather than
    /// trusting one passed across the thread boundary.
    pub fn derive(root: &Path, id: &AssetId) -> Self {
        Self {
            id: id.clone(),
            root: root.to_path_buf(),
            path: root.join(id.file_name()),
        }
    }

    /// Asset id this handle refers to.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Store root containing the asset.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the asset file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unique sibling path for an in-flight write.
    ///
    /// The leading dot keeps it out of the asset namespace, since asset ids may
    /// not start with one.
    pub(crate) fn temp_path(&self) -> PathBuf {
        self.root.join(format!(
            ".{}.tmp.{}",
            self.id.file_name(),
            uuid::Uuid::new_v4()
        ))
    }
}
