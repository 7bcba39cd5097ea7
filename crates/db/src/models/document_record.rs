//! Metadata kept for every stored PDF.

use serde::Serialize;
use realeagent_core::types::{DocumentId, FieldMap, Timestamp};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: uuid::Uuid,
    pub template_id: String,
    pub transaction_id: String,
    pub property_id: Option<String>,
    pub document_id: DocumentId,
    pub storage_key: String,
    pub storage_backend: String,
    /// Field values the PDF was generated from.
    pub field_data: FieldMap,
    pub created_at: Timestamp,
}

pub struct CreateDocumentRecord {
    pub template_id: String,
    pub transaction_id: String,
    pub property_id: Option<String>,
    pub document_id: DocumentId,
    pub storage_key: String,
    pub storage_backend: String,
    pub field_data: FieldMap,
}
