//! Streaming write path.

use crate::error::{StorageError, StorageResult};
use crate::handle::AssetHandle;
use crate::traits::BlobWriter;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// Writes assets through an async open → write → close stream.
///
/// Bytes go to a hidden sibling file; closing the stream fsyncs it and renames
/// it over the asset, so readers see either the old or the new content.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectWriter;

impl DirectWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BlobWriter for DirectWriter {
    #[instrument(skip(self, handle, data), fields(id = %handle.id(), size = data.len()))]
    async fn write_all(&self, handle: &AssetHandle, data: Bytes) -> StorageResult<()> {
        let id = handle.id().clone();
        let mut stream = WritableStream::open(handle)
            .await
            .map_err(|e| StorageError::write(&id, e))?;

        if let Err(e) = stream.write(&data).await {
            stream.abort().await;
            return Err(StorageError::write(&id, e));
        }

        let written = stream
            .close()
            .await
            .map_err(|e| StorageError::write(&id, e))?;
        tracing::debug!(bytes = written, "streaming write committed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// Open streaming write session for one asset.
struct WritableStream {
    file: fs::File,
    temp_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
}

impl WritableStream {
    async fn open(handle: &AssetHandle) -> std::io::Result<Self> {
        let temp_path = handle.temp_path();
        let file = fs::File::create(&temp_path).await?;
        Ok(Self {
            file,
            temp_path,
            final_path: handle.path().to_path_buf(),
            bytes_written: 0,
        })
    }

    async fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.file.write_all(data).await?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush to disk and atomically replace the asset.
    async fn close(mut self) -> std::io::Result<u64> {
        let result = async {
            self.file.flush().await?;
            self.file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;

        if let Err(e) = result {
            self.abort().await;
            return Err(e);
        }

        let Self {
            file,
            temp_path,
            final_path,
            bytes_written,
        } = self;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &final_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        Ok(bytes_written)
    }

    async fn abort(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path).await;
    }
}
