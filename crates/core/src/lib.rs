//! Core domain types and shared logic for Shelf.
//!
//! This crate defines the pieces every other crate agrees on:
//! - Asset identifiers and the on-disk naming convention
//! - Application configuration
//! - The shared core error type

pub mod asset_id;
pub mod config;
pub mod error;

pub use asset_id::AssetId;
pub use error::{Error, Result};

/// File extension appended to every stored asset.
pub const ASSET_EXTENSION: &str = "epub";

/// Maximum asset id length in bytes.
///
/// Keeps `<id>.epub` under the 255-byte file name limit common to local filesystems.
pub const MAX_ASSET_ID_LEN: usize = 250;
