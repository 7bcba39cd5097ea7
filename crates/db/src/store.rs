use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::Arc;

use tokio::sync::RwLock;

use realeagent_core::property::{demo_properties, Property};
use realeagent_core::types::{DocumentId, UserId};

use crate::models::document::Document;
use crate::models::document_record::DocumentRecord;
use crate::models::session::Session;
use crate::models::user::User;

/// Cloneable handle to the shared in-memory tables.
///
/// Locks guard memory safety only; two requests mutating the same document
/// may interleave between a read and the following write.
#[derive(Clone)]
pub struct MemoryStore {
    pub(crate) inner: Arc<Tables>,
}

pub(crate) struct Tables {
    pub(crate) users: RwLock<HashMap<UserId, User>>,
    pub(crate) next_user_id: AtomicI64,
    /// Keyed by SHA-256 hex of the bearer token.
    pub(crate) sessions: RwLock<HashMap<String, Session>>,
    pub(crate) documents: RwLock<HashMap<DocumentId, Document>>,
    pub(crate) document_records: RwLock<Vec<DocumentRecord>>,
    pub(crate) properties: Vec<Property>,
}

impl MemoryStore {
    /// Empty user, session, and document tables over the embedded property
    /// catalog.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Tables {
                users: RwLock::default(),
                next_user_id: AtomicI64::new(1),
                sessions: RwLock::default(),
                documents: RwLock::default(),
                document_records: RwLock::default(),
                properties: demo_properties().to_vec(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
