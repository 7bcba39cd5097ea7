//! Route definitions for the `/documents` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`. All require auth.
///
/// ```text
/// GET   /                  -> list
/// POST  /generate          -> generate
/// GET   /{id}              -> get_by_id
/// GET   /{id}/pdf          -> download_pdf
/// PATCH /{id}/fields       -> update_fields
/// POST  /{id}/finalize     -> finalize
/// POST  /{id}/sign         -> sign
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list))
        .route("/generate", post(documents::generate))
        .route("/{id}", get(documents::get_by_id))
        .route("/{id}/pdf", get(documents::download_pdf))
        .route("/{id}/fields", patch(documents::update_fields))
        .route("/{id}/finalize", post(documents::finalize))
        .route("/{id}/sign", post(documents::sign))
}
