use axum::routing::get;
use axum::Router;

use crate::handlers::properties;
use crate::state::AppState;

/// Routes mounted at `/properties`. Public.
///
/// ```text
/// GET /search    -> search
/// GET /{id}      -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(properties::search))
        .route("/{id}", get(properties::get_by_id))
}
