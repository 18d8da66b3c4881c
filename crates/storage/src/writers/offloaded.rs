//! Worker-offloaded write path.
//!
//! Some environments cannot drive the async streaming path (for example when
//! the caller is polled by an executor without a Tokio reactor). There the
//! write is handed to a short-lived dedicated thread that performs a blocking,
//! block-level session on the file:
//!
//! ```text
//! caller                         worker thread
//! ──────                         ─────────────
//! spawn worker ───────────────►  (started)
//! send {root, id, bytes} ─────►  derive own handle
//!                                open session
//!                                truncate(0)
//!                                write_at(bytes, 0)
//!                                flush
//!                                close
//! await one response ◄────────── {success} | {failure, error}
//! terminate worker               (exits)
//! ```
//!
//! One worker per call; workers are never reused.

use crate::error::{StorageError, StorageResult};
use crate::handle::AssetHandle;
use crate::traits::BlobWriter;
use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::oneshot;
use shelf_core::AssetId;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use tracing::instrument;

const WORKER_THREAD_NAME: &str = "shelf-asset-writer";

/// Hands each write to a dedicated worker thread.
///
/// There is no timeout on the worker round-trip: a worker that never answers
/// stalls the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct OffloadedWriter;

impl OffloadedWriter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BlobWriter for OffloadedWriter {
    #[instrument(skip(self, handle, data), fields(id = %handle.id(), size = data.len()))]
    async fn write_all(&self, handle: &AssetHandle, data: Bytes) -> StorageResult<()> {
        let id = handle.id().clone();
        let (response_tx, response_rx) = oneshot::channel();

        let worker = Worker::spawn(response_tx)
            .map_err(|e| StorageError::worker(&id, format!("failed to start worker: {e}")))?;

        // Root and id only; the worker resolves the file on its own side.
        worker
            .post(WriteRequest {
                root: handle.root().to_path_buf(),
                id: id.clone(),
                data,
            })
            .map_err(|_| StorageError::worker(&id, "worker exited before receiving request"))?;

        let response = response_rx.await;
        worker.terminate();

        match response {
            Ok(WriteResponse::Success) => {
                tracing::debug!("offloaded write committed");
                Ok(())
            }
            Ok(WriteResponse::Failure(message)) => Err(StorageError::worker(&id, message)),
            Err(oneshot::Canceled) => Err(StorageError::worker(
                &id,
                "worker exited without responding",
            )),
        }
    }

    fn name(&self) -> &'static str {
        "offloaded"
    }
}

/// Message sent to the worker. The payload is moved, not copied.
struct WriteRequest {
    root: PathBuf,
    id: AssetId,
    data: Bytes,
}

/// The single message a worker posts back.
#[derive(Debug)]
enum WriteResponse {
    Success,
    Failure(String),
}

/// A running worker thread awaiting exactly one request.
struct Worker {
    requests: mpsc::Sender<WriteRequest>,
    thread: thread::JoinHandle<()>,
}

impl Worker {
    fn spawn(response_tx: oneshot::Sender<WriteResponse>) -> std::io::Result<Self> {
        let (requests, request_rx) = mpsc::channel::<WriteRequest>();
        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let Ok(request) = request_rx.recv() else {
                    return;
                };
                let response = handle_request(request);
                let _ = response_tx.send(response);
            })?;
        Ok(Self { requests, thread })
    }

    fn post(&self, request: WriteRequest) -> Result<(), mpsc::SendError<WriteRequest>> {
        self.requests.send(request)
    }

    /// Release the worker.
    ///
    /// The thread returns as soon as it has posted its response, so it is only
    /// joined when already finished; otherwise it is detached and exits alone.
    fn terminate(self) {
        let Self { requests, thread } = self;
        drop(requests);
        if thread.is_finished() {
            let _ = thread.join();
        }
    }
}

/// Worker-side request handling.
fn handle_request(request: WriteRequest) -> WriteResponse {
    respond_with(|| write_with_session(&request.root, &request.id, &request.data))
}

/// Run a session and turn its outcome, including a panic, into a response.
fn respond_with(session: impl FnOnce() -> std::io::Result<()>) -> WriteResponse {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(session)) {
        Ok(Ok(())) => WriteResponse::Success,
        Ok(Err(e)) => WriteResponse::Failure(e.to_string()),
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown worker error".to_string());
            WriteResponse::Failure(format!("worker panicked: {message}"))
        }
    }
}

fn write_with_session(root: &Path, id: &AssetId, data: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(root)?;
    let handle = AssetHandle::derive(root, id);

    if let Ok(meta) = std::fs::symlink_metadata(handle.path())
        && meta.file_type().is_symlink()
    {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("asset file is a symbolic link: {}", handle.path().display()),
        ));
    }

    let mut session = SyncAccessHandle::open(handle.path())?;
    session.truncate(0)?;
    session.write_at(data, 0)?;
    session.flush()?;
    session.close();
    Ok(())
}

/// Blocking, block-level access to one file.
///
/// Only ever used from a worker thread.
struct SyncAccessHandle {
    file: std::fs::File,
}

impl SyncAccessHandle {
    fn open(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(Self { file })
    }

    fn truncate(&mut self, size: u64) -> std::io::Result<()> {
        self.file.set_len(size)
    }

    fn write_at(&mut self, buf: &[u8], at: u64) -> std::io::Result<usize> {
        self.file.seek(SeekFrom::Start(at))?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()
    }

    fn close(self) {
        drop(self.file);
    }
}
