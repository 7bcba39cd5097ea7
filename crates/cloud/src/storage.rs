//! Document storage with a single local-disk fallback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::local::LocalProvider;
use crate::provider::{StorageBackend, StorageProvider};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Where a document ended up after [`DocumentStorage::store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub backend: StorageBackend,
    pub key: String,
    pub size: u64,
}

impl StoredObject {
    /// `s3://key` or `local://key`, used as the document's `pdfPath`.
    pub fn location(&self) -> String {
        format!("{}://{}", self.backend.as_str(), self.key)
    }
}

#[derive(Clone)]
pub struct DocumentStorage {
    primary: Option<Arc<dyn StorageProvider>>,
    local: Arc<LocalProvider>,
}

impl DocumentStorage {
    /// `primary` is tried first; `local` receives writes when it fails or is
    /// absent.
    pub fn new(primary: Option<Arc<dyn StorageProvider>>, local: LocalProvider) -> Self {
        Self {
            primary,
            local: Arc::new(local),
        }
    }

    pub fn local_only(local: LocalProvider) -> Self {
        Self::new(None, local)
    }

    pub fn primary_backend(&self) -> StorageBackend {
        self.primary
            .as_ref()
            .map_or(StorageBackend::Local, |p| p.backend())
    }

    /// Store a PDF under `key`. A failed primary upload is retried once
    /// against local disk; there is no further fallback.
    pub async fn store(&self, key: &str, bytes: Vec<u8>) -> Result<StoredObject, StorageError> {
        let size = bytes.len() as u64;

        if let Some(primary) = &self.primary {
            match primary.put(key, bytes.clone(), PDF_CONTENT_TYPE).await {
                Ok(()) => {
                    tracing::info!(key, size, backend = primary.backend().as_str(), "Stored document");
                    return Ok(StoredObject {
                        backend: primary.backend(),
                        key: key.to_string(),
                        size,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        key,
                        error = %e,
                        "Primary storage upload failed, falling back to local disk"
                    );
                }
            }
        }

        self.local.put(key, bytes, PDF_CONTENT_TYPE).await?;
        tracing::info!(key, size, backend = "local", "Stored document");
        Ok(StoredObject {
            backend: StorageBackend::Local,
            key: key.to_string(),
            size,
        })
    }

    /// Read an object back from the backend it was stored on.
    pub async fn fetch(&self, backend: StorageBackend, key: &str) -> Result<Vec<u8>, StorageError> {
        match backend {
            StorageBackend::Local => self.local.get(key).await,
            backend => match &self.primary {
                Some(primary) if primary.backend() == backend => primary.get(key).await,
                _ => Err(StorageError::NotConfigured(backend.as_str())),
            },
        }
    }

    /// [`fetch`](Self::fetch) for a location produced by [`StoredObject::location`].
    pub async fn fetch_location(&self, location: &str) -> Result<Vec<u8>, StorageError> {
        let (backend, key) = parse_location(location)?;
        self.fetch(backend, key).await
    }
}

/// Split `s3://key` / `local://key` into backend and key.
pub fn parse_location(location: &str) -> Result<(StorageBackend, &str), StorageError> {
    let (scheme, key) = location
        .split_once("://")
        .ok_or_else(|| StorageError::InvalidKey(location.to_string()))?;
    let backend = match scheme {
        "s3" => StorageBackend::S3,
        "local" => StorageBackend::Local,
        _ => return Err(StorageError::InvalidKey(location.to_string())),
    };
    Ok((backend, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pretends to be S3 and fails every call.
    #[derive(Default)]
    struct FailingProvider {
        puts: AtomicUsize,
    }

    #[async_trait]
    impl StorageProvider for FailingProvider {
        fn backend(&self) -> StorageBackend {
            StorageBackend::S3
        }

        async fn put(&self, _key: &str, _bytes: Vec<u8>, _ct: &str) -> Result<(), StorageError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::S3("connection refused".into()))
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    #[tokio::test]
    async fn local_only_stores_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DocumentStorage::local_only(LocalProvider::new(dir.path()));

        let stored = storage
            .store("t1/documents/AD_1.pdf", b"pdf".to_vec())
            .await
            .expect("store");
        assert_eq!(stored.backend, StorageBackend::Local);
        assert_eq!(stored.size, 3);
        assert_eq!(stored.location(), "local://t1/documents/AD_1.pdf");
        assert_eq!(
            storage.fetch_location(&stored.location()).await.expect("fetch"),
            b"pdf"
        );
    }

    #[tokio::test]
    async fn failed_primary_falls_back_once_to_local() {
        let dir = tempfile::tempdir().expect("tempdir");
        let primary = Arc::new(FailingProvider::default());
        let storage = DocumentStorage::new(
            Some(primary.clone() as Arc<dyn StorageProvider>),
            LocalProvider::new(dir.path()),
        );
        assert_eq!(storage.primary_backend(), StorageBackend::S3);

        let stored = storage
            .store("t1/documents/RPA_2.pdf", b"%PDF".to_vec())
            .await
            .expect("store");
        assert_eq!(primary.puts.load(Ordering::SeqCst), 1);
        assert_eq!(stored.backend, StorageBackend::Local);
        assert_eq!(
            storage.fetch(stored.backend, &stored.key).await.expect("fetch"),
            b"%PDF"
        );
    }

    #[tokio::test]
    async fn fetch_from_unconfigured_backend_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DocumentStorage::local_only(LocalProvider::new(dir.path()));
        assert_matches!(
            storage.fetch_location("s3://x.pdf").await,
            Err(StorageError::NotConfigured("s3"))
        );
        assert_matches!(
            storage.fetch_location("ftp://x.pdf").await,
            Err(StorageError::InvalidKey(_))
        );
    }

    #[tokio::test]
    async fn invalid_key_is_rejected_locally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DocumentStorage::local_only(LocalProvider::new(dir.path()));
        assert_matches!(
            storage.store("../escape.pdf", b"x".to_vec()).await,
            Err(StorageError::InvalidKey(_))
        );
    }
}
