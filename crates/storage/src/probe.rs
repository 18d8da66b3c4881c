//! Write capability detection.

use crate::handle::AssetHandle;
use crate::traits::CapabilityProbe;
use shelf_core::config::WriteStrategy;

/// Probe backed by the configured [`WriteStrategy`].
///
/// In `Auto` mode the streaming path is available only when the calling thread
/// runs inside a Tokio runtime, since `tokio::fs` needs one to drive its
/// blocking pool. The check is cheap and runs for every write.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostProbe {
    strategy: WriteStrategy,
}

impl HostProbe {
    pub fn new(strategy: WriteStrategy) -> Self {
        Self { strategy }
    }
}

impl CapabilityProbe for HostProbe {
    fn supports_streaming_write(&self, handle: &AssetHandle) -> bool {
        let supported = match self.strategy {
            WriteStrategy::Direct => true,
            WriteStrategy::Offloaded => false,
            WriteStrategy::Auto => tokio::runtime::Handle::try_current().is_ok(),
        };
        tracing::trace!(id = %handle.id(), strategy = ?self.strategy, supported, "probed streaming write");
        supported
    }
}
