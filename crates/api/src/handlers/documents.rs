//! Handlers for the `/documents` resource.
//!
//! Generation creates a draft and stores its first PDF. Drafts accept field
//! edits until they are finalized; finalized documents can be signed once.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use realeagent_cloud::{StorageError, StoredObject};
use realeagent_core::document::{
    ensure_editable, ensure_finalizable, ensure_signable, merge_fields, validate_transaction_id,
    DocumentStatus,
};
use realeagent_core::error::CoreError;
use realeagent_core::property::{clamp_limit, clamp_offset, Property};
use realeagent_core::signature::{SignatureRequest, Signer};
use realeagent_core::templates::{
    find_template, missing_required_fields, render_html, TemplateDefinition,
};
use realeagent_core::types::{DocumentId, FieldMap};
use realeagent_db::models::document::{CreateDocument, Document};
use realeagent_db::repositories::{DocumentRepo, PropertyRepo, UserRepo};
use realeagent_pdf::FillReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::pipeline::{self, StoredPdf};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for `GET /documents`.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum page size for `GET /documents`.
const MAX_LIST_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /documents/generate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    pub template_code: String,
    /// Defaults to the new document's id.
    pub transaction_id: Option<String>,
    pub property_id: Option<String>,
    #[serde(default)]
    pub fields: FieldMap,
}

/// Request body for `PATCH /documents/{id}/fields`.
#[derive(Debug, Deserialize)]
pub struct UpdateFieldsRequest {
    /// `null` values remove the key.
    pub fields: FieldMap,
}

/// Request body for `POST /documents/{id}/sign`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignRequest {
    /// Defaults to the authenticated user.
    #[serde(default)]
    #[validate(nested)]
    pub signers: Vec<Signer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub document: Document,
    pub fill_report: FillReport,
    pub storage: StoredObject,
}

#[derive(Debug, Serialize)]
pub struct DocumentPage {
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<Document>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/documents/generate
///
/// Create a draft from a template, fill its PDF, and store it. The draft is
/// discarded if the PDF cannot be rendered or stored.
pub async fn generate(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<GenerateDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    let template = find_template(&input.template_code)
        .ok_or_else(|| AppError::UnknownTemplate(input.template_code.clone()))?;

    let mut fields = input.fields;
    if let Some(property_id) = &input.property_id {
        let property = PropertyRepo::find_by_id(&state.pool, property_id)
            .ok_or_else(|| AppError::Core(CoreError::not_found("Property", property_id)))?;
        prefill_from_property(&mut fields, &property);
    }

    let id = DocumentId::new_v4();
    let transaction_id = input.transaction_id.unwrap_or_else(|| id.to_string());
    validate_transaction_id(&transaction_id)?;

    let document = DocumentRepo::create(
        &state.pool,
        CreateDocument {
            id,
            doc_type: template.category,
            template_code: template.code.to_string(),
            transaction_id,
            property_id: input.property_id,
            agent_id: user.user_id,
            html_content: render_html(template, &fields),
            fields,
        },
    )
    .await;

    let StoredPdf {
        document,
        report,
        stored,
    } = match pipeline::generate_and_store(&state, &document, template).await {
        Ok(stored) => stored,
        Err(e) => {
            DocumentRepo::delete(&state.pool, document.id).await;
            tracing::warn!(document_id = %document.id, "PDF generation failed, draft discarded");
            return Err(e);
        }
    };

    tracing::info!(
        document_id = %document.id,
        template = template.code,
        agent_id = user.user_id,
        location = %stored.location(),
        "Document generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(GeneratedDocument {
            document,
            fill_report: report,
            storage: stored,
        })),
    ))
}

/// GET /api/v1/documents
///
/// The caller's own documents, newest first.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<DataResponse<DocumentPage>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let all = DocumentRepo::list_for_agent(&state.pool, user.user_id).await;
    let total = all.len();
    let items = all
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    Ok(Json(DataResponse::new(DocumentPage {
        total,
        limit,
        offset,
        items,
    })))
}

/// GET /api/v1/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DocumentId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = load_for_user(&state, &user, id).await?;
    Ok(Json(DataResponse::new(document)))
}

/// GET /api/v1/documents/{id}/pdf
///
/// Serve the stored PDF. Regenerates and stores a fresh copy when none
/// exists yet, when fields changed since the last render, or when the stored
/// object has gone missing.
pub async fn download_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DocumentId>,
) -> AppResult<impl IntoResponse> {
    let document = load_for_user(&state, &user, id).await?;
    let template = template_for(&document)?;

    let stored = match &document.pdf_path {
        Some(location) => match state.storage.fetch_location(location).await {
            Ok(bytes) => Some(bytes),
            Err(StorageError::NotFound(key)) => {
                tracing::warn!(document_id = %id, key = %key, "Stored PDF missing, regenerating");
                None
            }
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    let bytes = match stored {
        Some(bytes) => bytes,
        None => {
            let StoredPdf { stored, .. } =
                pipeline::generate_and_store(&state, &document, template).await?;
            state.storage.fetch(stored.backend, &stored.key).await?
        }
    };

    let disposition = format!(
        "attachment; filename=\"{}_{}.pdf\"",
        document.template_code, document.id
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// PATCH /api/v1/documents/{id}/fields
///
/// Merge field values into a draft and re-render its HTML. The stored PDF is
/// regenerated on the next download or on finalize.
pub async fn update_fields(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DocumentId>,
    AppJson(input): AppJson<UpdateFieldsRequest>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = load_for_user(&state, &user, id).await?;
    ensure_editable(document.status)?;
    let template = template_for(&document)?;

    let mut fields = document.fields;
    merge_fields(&mut fields, input.fields);
    let html = render_html(template, &fields);

    let updated = DocumentRepo::update_fields(&state.pool, id, fields, html)
        .await
        .ok_or_else(|| AppError::Core(CoreError::not_found("Document", id)))?;

    tracing::info!(document_id = %id, user_id = user.user_id, "Document fields updated");
    Ok(Json(DataResponse::new(updated)))
}

/// POST /api/v1/documents/{id}/finalize
///
/// Lock a complete draft, storing the final PDF.
pub async fn finalize(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DocumentId>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = load_for_user(&state, &user, id).await?;
    let template = template_for(&document)?;

    let missing = missing_required_fields(template, &document.fields);
    match ensure_finalizable(document.status, &missing) {
        Ok(()) => {}
        Err(CoreError::Validation(_)) => return Err(AppError::MissingFields(missing)),
        Err(e) => return Err(e.into()),
    }

    pipeline::generate_and_store(&state, &document, template).await?;

    let finalized = DocumentRepo::set_status(&state.pool, id, DocumentStatus::Finalized)
        .await
        .ok_or_else(|| AppError::Core(CoreError::not_found("Document", id)))?;

    tracing::info!(document_id = %id, user_id = user.user_id, "Document finalized");
    Ok(Json(DataResponse::new(finalized)))
}

/// POST /api/v1/documents/{id}/sign
///
/// Send a finalized document through the e-signature provider.
pub async fn sign(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DocumentId>,
    AppJson(input): AppJson<SignRequest>,
) -> AppResult<Json<DataResponse<Document>>> {
    input.validate()?;
    let document = load_for_user(&state, &user, id).await?;
    ensure_signable(document.status)?;
    let template = template_for(&document)?;

    let signers = if input.signers.is_empty() {
        let me = UserRepo::find_by_id(&state.pool, user.user_id)
            .await
            .ok_or_else(|| AppError::Core(CoreError::not_found("User", user.user_id)))?;
        vec![Signer {
            name: me.name,
            email: me.email,
        }]
    } else {
        input.signers
    };

    let receipt = state
        .signer
        .request_signature(SignatureRequest {
            document_id: id,
            document_title: template.name.to_string(),
            signers,
        })
        .await?;

    tracing::info!(
        document_id = %id,
        provider = %receipt.provider,
        envelope_id = %receipt.envelope_id,
        "Document signed"
    );

    let signed = DocumentRepo::set_signature(&state.pool, id, receipt)
        .await
        .ok_or_else(|| AppError::Core(CoreError::not_found("Document", id)))?;
    Ok(Json(DataResponse::new(signed)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a document the caller is allowed to see: their own, or any when
/// their role oversees other agents.
async fn load_for_user(state: &AppState, user: &AuthUser, id: DocumentId) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await
        .ok_or_else(|| AppError::Core(CoreError::not_found("Document", id)))?;

    if document.agent_id != user.user_id && !user.can_view_all_documents() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this document".into(),
        )));
    }
    Ok(document)
}

fn template_for(document: &Document) -> AppResult<&'static TemplateDefinition> {
    find_template(&document.template_code).ok_or_else(|| {
        AppError::InternalError(format!(
            "Document {} references unknown template {}",
            document.id, document.template_code
        ))
    })
}

/// Fill property-derived keys the caller did not supply.
fn prefill_from_property(fields: &mut FieldMap, property: &Property) {
    let derived = [
        ("propertyAddress", property.full_address()),
        ("city", property.city.clone()),
        ("zipCode", property.zip_code.clone()),
        ("mlsNumber", property.mls_number.clone()),
    ];
    for (key, value) in derived {
        fields
            .entry(key.to_string())
            .or_insert_with(|| Value::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realeagent_core::property::demo_properties;
    use serde_json::json;

    #[test]
    fn prefill_keeps_caller_values() {
        let property = &demo_properties()[0];
        let mut fields = json!({ "city": "Override" }).as_object().cloned().unwrap();
        prefill_from_property(&mut fields, property);

        assert_eq!(fields["city"], json!("Override"));
        assert_eq!(fields["propertyAddress"], json!(property.full_address()));
        assert_eq!(fields["mlsNumber"], json!(property.mls_number));
    }
}
