use std::sync::Arc;

use realeagent_cloud::{DocumentStorage, LocalProvider, S3Provider, StorageProvider};
use realeagent_core::signature::{MockSignatureProvider, SignatureProvider};

use crate::config::{ServerConfig, StorageConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a handle.
#[derive(Clone)]
pub struct AppState {
    /// In-memory store handle.
    pub pool: realeagent_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub storage: DocumentStorage,
    pub signer: Arc<dyn SignatureProvider>,
}

impl AppState {
    /// Wire storage from `config` and the mock e-signature provider.
    pub fn new(pool: realeagent_db::DbPool, config: ServerConfig) -> Self {
        let storage = build_storage(&config.storage);
        Self {
            pool,
            config: Arc::new(config),
            storage,
            signer: Arc::new(MockSignatureProvider),
        }
    }
}

/// S3 when configured, with local disk as the fallback (or sole) store.
pub fn build_storage(config: &StorageConfig) -> DocumentStorage {
    let local = LocalProvider::new(config.local_dir.clone());
    let primary = config
        .s3
        .as_ref()
        .map(|s3| Arc::new(S3Provider::new(s3)) as Arc<dyn StorageProvider>);
    DocumentStorage::new(primary, local)
}
