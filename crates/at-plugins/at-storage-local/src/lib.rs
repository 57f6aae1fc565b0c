//! # at-storage-local
//! Local filesystem implementation of `ObjectStore`.
//! Objects live under a root directory and are served under a URL prefix.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use at_core::error::BackendError;
use at_core::traits::ObjectStore;
use bytes::Bytes;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub struct LocalObjectStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/uploads")
    url_prefix: String,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self { root_path: root, url_prefix }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Resolves an object path under the root, refusing anything that
    /// could step outside it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        contained.then(|| self.root_path.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, path: &str, data: Bytes, _content_type: &str) -> Result<(), BackendError> {
        let target = self
            .resolve(path)
            .ok_or_else(|| BackendError::with_status(400, format!("Invalid object path {path:?}")))?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| BackendError::new(err.to_string()))?;
        }

        // create_new: an existing object is never overwritten
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => BackendError::with_status(409, "The resource already exists"),
                _ => BackendError::new(err.to_string()),
            })?;
        file.write_all(&data)
            .await
            .map_err(|err| BackendError::new(err.to_string()))?;
        file.flush().await.map_err(|err| BackendError::new(err.to_string()))?;

        tracing::debug!(path = %target.display(), bytes = data.len(), "object stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> Option<String> {
        self.resolve(path)?;
        Some(format!("{}/{}", self.url_prefix, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf(), "/uploads/");

        store
            .upload("public/a.png", Bytes::from_static(b"PNG"), "image/png")
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("public/a.png")).unwrap();
        assert_eq!(written, b"PNG");
        assert_eq!(store.public_url("public/a.png").as_deref(), Some("/uploads/public/a.png"));
    }

    #[tokio::test]
    async fn test_existing_object_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf(), "/uploads");

        store.upload("public/a.png", Bytes::from_static(b"first"), "image/png").await.unwrap();
        let err = store
            .upload("public/a.png", Bytes::from_static(b"second"), "image/png")
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(409));
        assert_eq!(std::fs::read(dir.path().join("public/a.png")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf(), "/uploads");

        assert!(store.upload("../escape.png", Bytes::new(), "image/png").await.is_err());
        assert!(store.upload("/etc/passwd", Bytes::new(), "text/plain").await.is_err());
        assert_eq!(store.public_url("../escape.png"), None);
    }
}
