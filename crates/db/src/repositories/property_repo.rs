//! Read-only access to the property catalog.

use realeagent_core::property::Property;

use crate::store::MemoryStore;

pub struct PropertyRepo;

impl PropertyRepo {
    pub fn all(pool: &MemoryStore) -> &[Property] {
        &pool.inner.properties
    }

    pub fn find_by_id(pool: &MemoryStore, id: &str) -> Option<Property> {
        pool.inner.properties.iter().find(|p| p.id == id).cloned()
    }
}
