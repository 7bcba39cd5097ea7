//! Object storage for generated documents: an S3-compatible primary with a
//! local-disk fallback.

pub mod error;
pub mod local;
pub mod provider;
pub mod s3;
pub mod storage;

pub use error::StorageError;
pub use local::LocalProvider;
pub use provider::{StorageBackend, StorageProvider};
pub use s3::{S3Config, S3Provider};
pub use storage::{parse_location, DocumentStorage, StoredObject, PDF_CONTENT_TYPE};
