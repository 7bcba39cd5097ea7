use axum::routing::get;
use axum::Router;

use crate::handlers::transactions;
use crate::state::AppState;

/// Routes mounted at `/transactions`.
///
/// ```text
/// GET /{transaction_id}/records    -> list_records (broker/admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{transaction_id}/records", get(transactions::list_records))
}
