//! Binary asset storage port (post photos, avatars).

use async_trait::async_trait;

/// Stores uploaded binaries and hands back opaque references that are
/// persisted on the owning record. Removal is best-effort by contract:
/// callers log failures and move on.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist the bytes and return a reference to them.
    async fn store(&self, bytes: &[u8], mime: &str) -> Result<String, AssetError>;

    /// Remove the asset behind a previously returned reference.
    async fn remove(&self, reference: &str) -> Result<(), AssetError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Asset store I/O failure: {0}")]
    Io(String),
}
