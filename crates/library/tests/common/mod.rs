pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{FailingMetadataStore, MemoryAssetStore, book_with_payload};
