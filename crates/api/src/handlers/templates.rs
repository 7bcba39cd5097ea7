//! Handlers for the `/templates` catalog.

use axum::Json;
use realeagent_core::templates::{find_template, list_templates, DocumentCategory, TemplateDefinition};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// Catalog entry returned by `GET /templates`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub code: &'static str,
    pub name: &'static str,
    pub category: DocumentCategory,
    pub required_fields: Vec<&'static str>,
}

impl From<&TemplateDefinition> for TemplateSummary {
    fn from(t: &TemplateDefinition) -> Self {
        Self {
            code: t.code,
            name: t.name,
            category: t.category,
            required_fields: t.required_fields.clone(),
        }
    }
}

/// GET /api/v1/templates
pub async fn list(_user: AuthUser) -> AppResult<Json<DataResponse<Vec<TemplateSummary>>>> {
    let summaries = list_templates().iter().map(TemplateSummary::from).collect();
    Ok(Json(DataResponse::new(summaries)))
}

/// GET /api/v1/templates/{code}
///
/// Full definition including field mappings.
pub async fn get(
    _user: AuthUser,
    AppPath(code): AppPath<String>,
) -> AppResult<Json<DataResponse<&'static TemplateDefinition>>> {
    let template = find_template(&code).ok_or(AppError::UnknownTemplate(code))?;
    Ok(Json(DataResponse::new(template)))
}
