//! Handlers for transaction-scoped document records.

use axum::extract::State;
use axum::Json;
use realeagent_db::models::document_record::DocumentRecord;
use realeagent_db::repositories::DocumentRecordRepo;

use crate::error::AppResult;
use crate::extract::AppPath;
use crate::middleware::rbac::RequireBroker;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/transactions/{transaction_id}/records
///
/// Every PDF stored for a transaction, oldest first. Broker or admin only.
pub async fn list_records(
    RequireBroker(_user): RequireBroker,
    State(state): State<AppState>,
    AppPath(transaction_id): AppPath<String>,
) -> AppResult<Json<DataResponse<Vec<DocumentRecord>>>> {
    let records = DocumentRecordRepo::list_for_transaction(&state.pool, &transaction_id).await;
    Ok(Json(DataResponse::new(records)))
}
