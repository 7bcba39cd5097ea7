//! Document PDF pipeline: load the template asset, fill it off the async
//! runtime, store the result, and record where it went.

use std::path::Path;

use realeagent_cloud::StoredObject;
use realeagent_core::document::storage_key;
use realeagent_core::error::CoreError;
use realeagent_core::templates::TemplateDefinition;
use realeagent_core::types::FieldMap;
use realeagent_db::models::document::Document;
use realeagent_db::models::document_record::CreateDocumentRecord;
use realeagent_db::repositories::{DocumentRecordRepo, DocumentRepo};
use realeagent_pdf::{FillReport, PdfError, PdfForm};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A filled, serialized PDF.
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub report: FillReport,
}

/// Result of [`generate_and_store`].
pub struct StoredPdf {
    pub document: Document,
    pub report: FillReport,
    pub stored: StoredObject,
}

/// Read the template's PDF asset. `None` when the file does not exist, in
/// which case a blank form is filled by coordinates instead.
async fn load_template_asset(
    templates_dir: &Path,
    template: &TemplateDefinition,
) -> AppResult<Option<Vec<u8>>> {
    let path = templates_dir.join(template.pdf_file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                template = template.code,
                path = %path.display(),
                "Template PDF not found, using a blank form"
            );
            Ok(None)
        }
        Err(e) => Err(AppError::InternalError(format!(
            "Failed to read template PDF {}: {e}",
            path.display()
        ))),
    }
}

/// Fill `template` with `fields` and serialize the result.
pub async fn render_pdf(
    state: &AppState,
    template: &'static TemplateDefinition,
    fields: FieldMap,
) -> AppResult<RenderedPdf> {
    let asset = load_template_asset(&state.config.templates_dir, template).await?;

    let (bytes, report) = tokio::task::spawn_blocking(move || -> Result<_, PdfError> {
        let mut form = match asset {
            Some(bytes) => PdfForm::load(&bytes)?,
            None => PdfForm::blank(template.page_count),
        };
        if form.was_decrypted() {
            tracing::info!(template = template.code, "Removed encryption from template PDF");
        }
        let report = form.fill(&fields, &template.mappings)?;
        Ok((form.to_bytes()?, report))
    })
    .await
    .map_err(|e| AppError::InternalError(format!("PDF task failed: {e}")))??;

    tracing::info!(
        template = template.code,
        strategy = ?report.strategy,
        filled = report.filled.len(),
        size = bytes.len(),
        "Rendered PDF"
    );
    Ok(RenderedPdf { bytes, report })
}

/// Render the document's PDF, store it under its storage key, write a
/// metadata record, and point the document at the stored copy.
pub async fn generate_and_store(
    state: &AppState,
    document: &Document,
    template: &'static TemplateDefinition,
) -> AppResult<StoredPdf> {
    let rendered = render_pdf(state, template, document.fields.clone()).await?;

    let key = storage_key(&document.transaction_id, template.code, &document.id);
    let stored = state.storage.store(&key, rendered.bytes).await?;

    DocumentRecordRepo::create(
        &state.pool,
        CreateDocumentRecord {
            template_id: template.code.to_string(),
            transaction_id: document.transaction_id.clone(),
            property_id: document.property_id.clone(),
            document_id: document.id,
            storage_key: stored.key.clone(),
            storage_backend: stored.backend.as_str().to_string(),
            field_data: document.fields.clone(),
        },
    )
    .await;

    let document = DocumentRepo::set_pdf_path(&state.pool, document.id, stored.location())
        .await
        .ok_or_else(|| CoreError::not_found("Document", document.id))?;

    Ok(StoredPdf {
        document,
        report: rendered.report,
        stored,
    })
}
