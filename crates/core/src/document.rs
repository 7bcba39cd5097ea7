//! Document lifecycle rules and storage key layout.
//!
//! A document moves `draft -> finalized -> signed`. Fields can only change
//! while the document is a draft.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocumentId, FieldMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Finalized,
    Signed,
}

impl DocumentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Signed => "signed",
        }
    }
}

/// Reject field updates unless the document is still a draft.
pub fn ensure_editable(status: DocumentStatus) -> Result<(), CoreError> {
    if status != DocumentStatus::Draft {
        return Err(CoreError::Conflict(format!(
            "Document is {} and can no longer be edited",
            status.as_str()
        )));
    }
    Ok(())
}

/// A document can be finalized once, from draft, with every required field present.
pub fn ensure_finalizable(status: DocumentStatus, missing: &[String]) -> Result<(), CoreError> {
    if status != DocumentStatus::Draft {
        return Err(CoreError::Conflict(format!(
            "Document is already {}",
            status.as_str()
        )));
    }
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Only finalized documents can be sent for signature.
pub fn ensure_signable(status: DocumentStatus) -> Result<(), CoreError> {
    if status != DocumentStatus::Finalized {
        return Err(CoreError::Conflict(format!(
            "Document must be finalized before signing (currently {})",
            status.as_str()
        )));
    }
    Ok(())
}

/// Transaction ids become the first path segment of a storage key.
pub fn validate_transaction_id(transaction_id: &str) -> Result<(), CoreError> {
    let valid = !transaction_id.is_empty()
        && transaction_id.len() <= 64
        && transaction_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid transactionId '{transaction_id}': use 1-64 letters, digits, '-' or '_'"
        )))
    }
}

/// Object-store key for a generated PDF:
/// `{transactionId}/documents/{templateCode}_{documentId}.pdf`.
pub fn storage_key(transaction_id: &str, template_code: &str, document_id: &DocumentId) -> String {
    format!("{transaction_id}/documents/{template_code}_{document_id}.pdf")
}

/// Merge a field update into existing values. A `null` removes the key.
pub fn merge_fields(existing: &mut FieldMap, updates: FieldMap) {
    for (key, value) in updates {
        if value.is_null() {
            existing.remove(&key);
        } else {
            existing.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn only_drafts_are_editable() {
        assert!(ensure_editable(DocumentStatus::Draft).is_ok());
        assert_matches!(
            ensure_editable(DocumentStatus::Finalized),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn finalize_requires_required_fields() {
        let missing = vec!["buyerName".to_string(), "offerDate".to_string()];
        match ensure_finalizable(DocumentStatus::Draft, &missing) {
            Err(CoreError::Validation(msg)) => {
                assert!(msg.contains("buyerName, offerDate"), "got: {msg}")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(ensure_finalizable(DocumentStatus::Draft, &[]).is_ok());
    }

    #[test]
    fn finalize_twice_is_a_conflict() {
        assert_matches!(
            ensure_finalizable(DocumentStatus::Finalized, &[]),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn signing_requires_finalized() {
        assert_matches!(ensure_signable(DocumentStatus::Draft), Err(CoreError::Conflict(_)));
        assert!(ensure_signable(DocumentStatus::Finalized).is_ok());
        assert_matches!(ensure_signable(DocumentStatus::Signed), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn storage_key_layout() {
        let id = uuid::Uuid::nil();
        assert_eq!(
            storage_key("txn-42", "RPA", &id),
            "txn-42/documents/RPA_00000000-0000-0000-0000-000000000000.pdf"
        );
    }

    #[test]
    fn transaction_id_rejects_path_segments() {
        assert!(validate_transaction_id("txn_2024-001").is_ok());
        assert_matches!(validate_transaction_id("../etc"), Err(CoreError::Validation(_)));
        assert_matches!(validate_transaction_id(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn merge_overwrites_and_removes() {
        let mut existing = json!({ "a": 1, "b": "keep", "c": true })
            .as_object()
            .cloned()
            .unwrap();
        let updates = json!({ "a": 2, "c": null, "d": "new" })
            .as_object()
            .cloned()
            .unwrap();
        merge_fields(&mut existing, updates);
        assert_eq!(
            serde_json::Value::Object(existing),
            json!({ "a": 2, "b": "keep", "d": "new" })
        );
    }
}
