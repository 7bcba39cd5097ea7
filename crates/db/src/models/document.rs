//! Generated document model and DTOs.

use serde::Serialize;
use realeagent_core::document::DocumentStatus;
use realeagent_core::signature::SignatureReceipt;
use realeagent_core::templates::DocumentCategory;
use realeagent_core::types::{DocumentId, FieldMap, Timestamp, UserId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub doc_type: DocumentCategory,
    pub template_code: String,
    pub transaction_id: String,
    pub property_id: Option<String>,
    pub agent_id: UserId,
    pub status: DocumentStatus,
    pub fields: FieldMap,
    pub html_content: String,
    /// `s3://…` or `local://…` location of the last stored PDF.
    pub pdf_path: Option<String>,
    pub signature: Option<SignatureReceipt>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub finalized_at: Option<Timestamp>,
}

pub struct CreateDocument {
    pub id: DocumentId,
    pub doc_type: DocumentCategory,
    pub template_code: String,
    pub transaction_id: String,
    pub property_id: Option<String>,
    pub agent_id: UserId,
    pub fields: FieldMap,
    pub html_content: String,
}
