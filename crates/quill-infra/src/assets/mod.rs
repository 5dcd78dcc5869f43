//! Asset store implementations.

mod fs;

pub use fs::FsAssetStore;
