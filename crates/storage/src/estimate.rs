//! Storage usage estimation.

use crate::blocking::run_blocking;
use crate::error::StorageError;
use crate::traits::{UsageEstimate, UsageEstimator};
use async_trait::async_trait;
use std::path::Path;

/// Sums file sizes under the store root and reports a fixed quota.
#[derive(Clone, Copy, Debug)]
pub struct DirectoryEstimator {
    quota_bytes: u64,
}

impl DirectoryEstimator {
    pub fn new(quota_bytes: u64) -> Self {
        Self { quota_bytes }
    }

    fn used_bytes(root: &Path) -> std::io::Result<u64> {
        if !root.try_exists()? {
            return Ok(0);
        }

        let mut total = 0u64;
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                // file_type() does not follow symlinks, so links are never counted.
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() {
                    match entry.metadata() {
                        Ok(meta) => total = total.saturating_add(meta.len()),
                        // Removed between listing and stat.
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                        Err(e) => return Err(e),
                    }
                }
            }
        }
        Ok(total)
    }
}

#[async_trait]
impl UsageEstimator for DirectoryEstimator {
    async fn estimate(&self, root: &Path) -> Option<UsageEstimate> {
        let dir = root.to_path_buf();
        let used = run_blocking(move || Self::used_bytes(&dir).map_err(StorageError::Io)).await;
        match used {
            Ok(used_bytes) => Some(UsageEstimate {
                used_bytes,
                quota_bytes: self.quota_bytes,
            }),
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "usage estimation failed");
                None
            }
        }
    }
}

/// Estimator for environments without usage reporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedEstimator;

#[async_trait]
impl UsageEstimator for UnsupportedEstimator {
    async fn estimate(&self, _root: &Path) -> Option<UsageEstimate> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_root_reports_zero_usage() {
        let dir = tempfile::tempdir().unwrap();
        let estimate = DirectoryEstimator::new(1024)
            .estimate(&dir.path().join("missing"))
            .await
            .unwrap();
        assert_eq!(
            estimate,
            UsageEstimate {
                used_bytes: 0,
                quota_bytes: 1024
            }
        );
    }

    #[tokio::test]
    async fn test_sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.epub"), vec![0u8; 100]).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b"), vec![0u8; 23]).unwrap();

        let estimate = DirectoryEstimator::new(1024)
            .estimate(dir.path())
            .await
            .unwrap();
        assert_eq!(estimate.used_bytes, 123);
    }

    #[tokio::test]
    async fn test_unsupported_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(UnsupportedEstimator.estimate(dir.path()).await.is_none());
    }
}
