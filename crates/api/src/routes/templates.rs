use axum::routing::get;
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET /          -> list
/// GET /{code}    -> get
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(templates::list))
        .route("/{code}", get(templates::get))
}
