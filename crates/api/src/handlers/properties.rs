//! Handlers for the public `/properties` catalog.

use axum::extract::State;
use axum::Json;
use realeagent_core::error::CoreError;
use realeagent_core::property::{search as search_properties, Property, PropertySearchParams, SearchPage};
use realeagent_db::repositories::PropertyRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/properties/search
pub async fn search(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PropertySearchParams>,
) -> AppResult<Json<DataResponse<SearchPage>>> {
    let page = search_properties(PropertyRepo::all(&state.pool), &params)?;
    tracing::debug!(total = page.total, returned = page.results.len(), "Property search");
    Ok(Json(DataResponse::new(page)))
}

/// GET /api/v1/properties/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<DataResponse<Property>>> {
    let property = PropertyRepo::find_by_id(&state.pool, &id)
        .ok_or_else(|| AppError::Core(CoreError::not_found("Property", &id)))?;
    Ok(Json(DataResponse::new(property)))
}
