//! Full-payload write paths.
//!
//! - [`DirectWriter`]: async streaming write that commits on close
//! - [`OffloadedWriter`]: blocking block-access session on a dedicated thread

pub mod direct;
pub mod offloaded;

pub use direct::DirectWriter;
pub use offloaded::OffloadedWriter;
