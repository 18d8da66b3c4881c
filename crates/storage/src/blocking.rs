//! Blocking filesystem work driven from async store operations.

use crate::error::{StorageError, StorageResult};

/// Run `work` on the Tokio blocking pool when a runtime is available, inline
/// otherwise.
///
/// Every store operation goes through here so that a store polled by an
/// executor without a Tokio reactor stays fully usable.
pub(crate) async fn run_blocking<F, T>(work: F) -> StorageResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    let runtime = tokio::runtime::Handle::try_current().ok();
    match runtime {
        Some(runtime) => runtime.spawn_blocking(work).await.map_err(|e| {
            StorageError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}")))
        })?,
        None => work(),
    }
}
