pub mod auth;
pub mod documents;
pub mod health;
pub mod properties;
pub mod templates;
pub mod transactions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                 login (public)
/// /auth/logout                                logout (requires auth)
/// /auth/me                                    current user
///
/// /templates                                  list
/// /templates/{code}                           full definition
///
/// /documents                                  list own (?limit, offset)
/// /documents/generate                         generate (POST)
/// /documents/{id}                             get
/// /documents/{id}/pdf                         download PDF
/// /documents/{id}/fields                      merge fields (PATCH)
/// /documents/{id}/finalize                    finalize (POST)
/// /documents/{id}/sign                        sign (POST)
///
/// /properties/search                          search (public)
/// /properties/{id}                            get (public)
///
/// /transactions/{transaction_id}/records      stored PDFs (broker/admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/templates", templates::router())
        .nest("/documents", documents::router())
        .nest("/properties", properties::router())
        .nest("/transactions", transactions::router())
}
