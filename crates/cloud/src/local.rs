//! Filesystem provider rooted at a directory.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::StorageError;
use crate::provider::{StorageBackend, StorageProvider};

#[derive(Debug, Clone)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key onto a path under the root, rejecting traversal and
    /// absolute keys.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains('\\') || key.contains('\0') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let relative = Path::new(key);
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir
                | Component::ParentDir
                | Component::RootDir
                | Component::Prefix(_) => {
                    return Err(StorageError::InvalidKey(key.to_string()));
                }
            }
        }
        Ok(path)
    }
}

#[async_trait]
impl StorageProvider for LocalProvider {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn put_then_get_creates_nested_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = LocalProvider::new(dir.path());

        provider
            .put("txn-1/documents/RPA_abc.pdf", b"%PDF-1.7".to_vec(), "application/pdf")
            .await
            .expect("put");

        let bytes = provider.get("txn-1/documents/RPA_abc.pdf").await.expect("get");
        assert_eq!(bytes, b"%PDF-1.7");
        assert!(dir.path().join("txn-1/documents/RPA_abc.pdf").is_file());
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = LocalProvider::new(dir.path());
        assert_matches!(provider.get("nope.pdf").await, Err(StorageError::NotFound(_)));
    }

    #[test]
    fn traversal_and_absolute_keys_are_rejected() {
        let provider = LocalProvider::new("/srv/storage");
        for key in ["../etc/passwd", "a/../../b", "/abs/path.pdf", "./x", "", "a\\b"] {
            assert_matches!(provider.path_for(key), Err(StorageError::InvalidKey(_)), "{key}");
        }
        assert_eq!(
            provider.path_for("t/documents/x.pdf").expect("valid"),
            PathBuf::from("/srv/storage/t/documents/x.pdf")
        );
    }
}
