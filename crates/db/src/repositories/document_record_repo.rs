//! Repository for stored-PDF metadata records.

use chrono::Utc;

use crate::models::document_record::{CreateDocumentRecord, DocumentRecord};
use crate::store::MemoryStore;

pub struct DocumentRecordRepo;

impl DocumentRecordRepo {
    pub async fn create(pool: &MemoryStore, input: CreateDocumentRecord) -> DocumentRecord {
        let record = DocumentRecord {
            id: uuid::Uuid::new_v4(),
            template_id: input.template_id,
            transaction_id: input.transaction_id,
            property_id: input.property_id,
            document_id: input.document_id,
            storage_key: input.storage_key,
            storage_backend: input.storage_backend,
            field_data: input.field_data,
            created_at: Utc::now(),
        };
        pool.inner.document_records.write().await.push(record.clone());
        record
    }

    /// Records for a transaction in insertion order.
    pub async fn list_for_transaction(pool: &MemoryStore, transaction_id: &str) -> Vec<DocumentRecord> {
        pool.inner
            .document_records
            .read()
            .await
            .iter()
            .filter(|r| r.transaction_id == transaction_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realeagent_core::types::FieldMap;

    fn record(txn: &str, key: &str) -> CreateDocumentRecord {
        CreateDocumentRecord {
            template_id: "RPA".into(),
            transaction_id: txn.into(),
            property_id: None,
            document_id: uuid::Uuid::new_v4(),
            storage_key: key.into(),
            storage_backend: "local".into(),
            field_data: FieldMap::new(),
        }
    }

    #[tokio::test]
    async fn lists_records_for_one_transaction_in_order() {
        let pool = MemoryStore::new();
        DocumentRecordRepo::create(&pool, record("t1", "a")).await;
        DocumentRecordRepo::create(&pool, record("t2", "b")).await;
        DocumentRecordRepo::create(&pool, record("t1", "c")).await;

        let keys: Vec<String> = DocumentRecordRepo::list_for_transaction(&pool, "t1")
            .await
            .into_iter()
            .map(|r| r.storage_key)
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
