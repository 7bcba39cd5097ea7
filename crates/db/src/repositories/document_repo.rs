//! Repository for generated documents.

use chrono::Utc;
use realeagent_core::document::DocumentStatus;
use realeagent_core::signature::SignatureReceipt;
use realeagent_core::types::{DocumentId, FieldMap, UserId};

use crate::models::document::{CreateDocument, Document};
use crate::store::MemoryStore;

pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new draft document.
    pub async fn create(pool: &MemoryStore, input: CreateDocument) -> Document {
        let now = Utc::now();
        let doc = Document {
            id: input.id,
            doc_type: input.doc_type,
            template_code: input.template_code,
            transaction_id: input.transaction_id,
            property_id: input.property_id,
            agent_id: input.agent_id,
            status: DocumentStatus::Draft,
            fields: input.fields,
            html_content: input.html_content,
            pdf_path: None,
            signature: None,
            created_at: now,
            updated_at: now,
            finalized_at: None,
        };
        pool.inner.documents.write().await.insert(doc.id, doc.clone());
        doc
    }

    pub async fn find_by_id(pool: &MemoryStore, id: DocumentId) -> Option<Document> {
        pool.inner.documents.read().await.get(&id).cloned()
    }

    /// Replace the field values and rendered HTML. Clears `pdf_path`, since
    /// the stored PDF no longer matches the fields.
    ///
    /// Returns `None` if no document with the given `id` exists.
    pub async fn update_fields(
        pool: &MemoryStore,
        id: DocumentId,
        fields: FieldMap,
        html_content: String,
    ) -> Option<Document> {
        Self::modify(pool, id, |doc| {
            doc.fields = fields;
            doc.html_content = html_content;
            doc.pdf_path = None;
        })
        .await
    }

    pub async fn set_pdf_path(pool: &MemoryStore, id: DocumentId, pdf_path: String) -> Option<Document> {
        Self::modify(pool, id, |doc| doc.pdf_path = Some(pdf_path)).await
    }

    /// Move a document to `status`, stamping `finalized_at` on finalize.
    pub async fn set_status(
        pool: &MemoryStore,
        id: DocumentId,
        status: DocumentStatus,
    ) -> Option<Document> {
        Self::modify(pool, id, |doc| {
            doc.status = status;
            if status == DocumentStatus::Finalized {
                doc.finalized_at = Some(Utc::now());
            }
        })
        .await
    }

    /// Attach a signature receipt and mark the document signed.
    pub async fn set_signature(
        pool: &MemoryStore,
        id: DocumentId,
        receipt: SignatureReceipt,
    ) -> Option<Document> {
        Self::modify(pool, id, |doc| {
            doc.status = DocumentStatus::Signed;
            doc.signature = Some(receipt);
        })
        .await
    }

    /// Remove a document. Returns `true` if one existed.
    pub async fn delete(pool: &MemoryStore, id: DocumentId) -> bool {
        pool.inner.documents.write().await.remove(&id).is_some()
    }

    /// Documents owned by `agent_id`, newest first.
    pub async fn list_for_agent(pool: &MemoryStore, agent_id: UserId) -> Vec<Document> {
        let mut docs: Vec<Document> = pool
            .inner
            .documents
            .read()
            .await
            .values()
            .filter(|d| d.agent_id == agent_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        docs
    }

    async fn modify(
        pool: &MemoryStore,
        id: DocumentId,
        apply: impl FnOnce(&mut Document),
    ) -> Option<Document> {
        let mut docs = pool.inner.documents.write().await;
        let doc = docs.get_mut(&id)?;
        apply(doc);
        doc.updated_at = Utc::now();
        Some(doc.clone())
    }
}
