//! File storage on the local filesystem, served under a public base URL.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::{FileStorage, StoredObject};
use crate::error::RemoteOperationError;

pub struct LocalFileStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for `key`.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), key)
    }

    /// Maps a key to a path under the root, refusing anything that could
    /// land outside it.
    fn resolve(&self, key: &str) -> Result<PathBuf, RemoteOperationError> {
        let relative = Path::new(key);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !only_normal {
            return Err(RemoteOperationError::Rejected(format!(
                "invalid storage key: {key:?}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<StoredObject, RemoteOperationError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create storage directory: {:?}", parent))?;
        }

        let size = data.len();
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write stored file: {:?}", path))?;
        debug!(key, size, ?mime_type, "Stored file");

        Ok(StoredObject {
            key: key.to_string(),
            url: self.url_for(key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_writes_under_root() {
        let dir = tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path(), "/files/");

        let stored = storage
            .put("uploads/1/10-a.txt", b"hello".to_vec(), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(stored.key, "uploads/1/10-a.txt");
        assert_eq!(stored.url, "/files/uploads/1/10-a.txt");

        let written = std::fs::read(dir.path().join("uploads/1/10-a.txt")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("store"), "/files");

        for key in ["../outside.txt", "/etc/passwd", "a/../../b", ""] {
            let result = storage.put(key, b"x".to_vec(), None).await;
            assert!(
                matches!(result, Err(RemoteOperationError::Rejected(_))),
                "{key:?} should be rejected"
            );
        }
        assert!(!dir.path().join("outside.txt").exists());
    }
}
