//! Asset store backends.

pub mod filesystem;
