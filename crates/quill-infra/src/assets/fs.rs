//! Filesystem-backed asset store.
//!
//! Uploads land as `<uuid>.<ext>` under the configured root directory
//! and are referenced as `/uploads/<file>`, the path they are served
//! from.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::ports::{AssetError, AssetStore};

/// The URL prefix stored references carry.
pub const PUBLIC_PREFIX: &str = "/uploads";

pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn extension_for(mime: &str) -> Result<&'static str, AssetError> {
        match mime {
            "image/png" => Ok("png"),
            "image/jpeg" => Ok("jpg"),
            "image/gif" => Ok("gif"),
            "image/webp" => Ok("webp"),
            "image/svg+xml" => Ok("svg"),
            other => Err(AssetError::UnsupportedMediaType(other.to_string())),
        }
    }

    /// Map a stored reference back to its file name, refusing anything
    /// that could escape the root directory.
    fn file_name(reference: &str) -> Result<&str, AssetError> {
        let name = reference.rsplit('/').next().unwrap_or(reference);
        if name.is_empty() || name.contains("..") || name.contains(std::path::MAIN_SEPARATOR) {
            return Err(AssetError::Io(format!("invalid reference: {reference}")));
        }
        Ok(name)
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn store(&self, bytes: &[u8], mime: &str) -> Result<String, AssetError> {
        let ext = Self::extension_for(mime)?;
        let file = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AssetError::Io(e.to_string()))?;
        tokio::fs::write(self.root.join(&file), bytes)
            .await
            .map_err(|e| AssetError::Io(e.to_string()))?;

        tracing::debug!(%file, size = bytes.len(), "asset stored");
        Ok(format!("{PUBLIC_PREFIX}/{file}"))
    }

    async fn remove(&self, reference: &str) -> Result<(), AssetError> {
        let name = Self::file_name(reference)?;
        tokio::fs::remove_file(self.root.join(name))
            .await
            .map_err(|e| AssetError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> FsAssetStore {
        let root = std::env::temp_dir().join(format!("quill-assets-{}", Uuid::new_v4()));
        FsAssetStore::new(root)
    }

    #[tokio::test]
    async fn stores_and_removes_a_png() {
        let store = scratch_store();

        let reference = store.store(b"not really a png", "image/png").await.unwrap();
        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with(".png"));

        let on_disk = store.root.join(reference.rsplit('/').next().unwrap());
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"not really a png");

        store.remove(&reference).await.unwrap();
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn rejects_unknown_media_types() {
        let store = scratch_store();
        let result = store.store(b"#!/bin/sh", "application/x-sh").await;
        assert!(matches!(result, Err(AssetError::UnsupportedMediaType(_))));
    }

    #[tokio::test]
    async fn removing_a_missing_asset_reports_io_failure() {
        let store = scratch_store();
        assert!(store.remove("/uploads/nothing-here.png").await.is_err());
    }

    #[tokio::test]
    async fn refuses_traversal_references() {
        let store = scratch_store();
        assert!(store.remove("/uploads/..").await.is_err());
        assert!(store.remove("").await.is_err());
    }
}
