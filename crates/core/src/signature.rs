//! E-signature provider seam.
//!
//! Only a mock provider exists: it "completes" every envelope immediately
//! and never leaves the process.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DocumentId, Timestamp};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct SignatureRequest {
    pub document_id: DocumentId,
    pub document_title: String,
    pub signers: Vec<Signer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReceipt {
    pub envelope_id: String,
    pub provider: String,
    pub status: String,
    pub signers: Vec<Signer>,
    pub completed_at: Timestamp,
}

#[async_trait]
pub trait SignatureProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn request_signature(&self, request: SignatureRequest) -> Result<SignatureReceipt, CoreError>;
}

/// Signs everything instantly. Stand-in for a real e-signature integration.
#[derive(Debug, Clone, Default)]
pub struct MockSignatureProvider;

#[async_trait]
impl SignatureProvider for MockSignatureProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn request_signature(&self, request: SignatureRequest) -> Result<SignatureReceipt, CoreError> {
        if request.signers.is_empty() {
            return Err(CoreError::Validation(
                "At least one signer is required".into(),
            ));
        }
        for signer in &request.signers {
            signer
                .validate()
                .map_err(|e| CoreError::Validation(format!("Invalid signer: {e}")))?;
        }

        Ok(SignatureReceipt {
            envelope_id: format!("mock-env-{}", uuid::Uuid::new_v4().simple()),
            provider: self.name().to_string(),
            status: "completed".to_string(),
            signers: request.signers,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(signers: Vec<Signer>) -> SignatureRequest {
        SignatureRequest {
            document_id: uuid::Uuid::new_v4(),
            document_title: "Counter Offer".into(),
            signers,
        }
    }

    #[tokio::test]
    async fn mock_completes_immediately() {
        let receipt = MockSignatureProvider
            .request_signature(request(vec![Signer {
                name: "Jane Buyer".into(),
                email: "jane@example.com".into(),
            }]))
            .await
            .expect("mock signing should succeed");

        assert_eq!(receipt.status, "completed");
        assert_eq!(receipt.provider, "mock");
        assert!(receipt.envelope_id.starts_with("mock-env-"));
        assert_eq!(receipt.signers.len(), 1);
    }

    #[tokio::test]
    async fn mock_requires_signers() {
        let result = MockSignatureProvider.request_signature(request(vec![])).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn mock_rejects_malformed_email() {
        let result = MockSignatureProvider
            .request_signature(request(vec![Signer {
                name: "No Email".into(),
                email: "not-an-email".into(),
            }]))
            .await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn signer_validation_checks_email_and_name() {
        let good = Signer {
            name: "Jane Buyer".into(),
            email: "jane@example.com".into(),
        };
        assert!(good.validate().is_ok());

        let bad_email = Signer {
            email: "jane@".into(),
            ..good.clone()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let no_name = Signer {
            name: String::new(),
            ..good
        };
        let errors = no_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
