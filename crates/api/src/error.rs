use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use realeagent_cloud::StorageError;
use realeagent_core::error::CoreError;
use realeagent_db::DbError;
use realeagent_pdf::PdfError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain crates' errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the
/// `{ "success": false, "error": { "code", "message" } }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `realeagent_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Request body failed `validator` rules.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// `templateCode` does not name a known template.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Finalize was attempted with required fields still blank.
    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<String>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            AppError::Database(DbError::Duplicate { entity, key }) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("{entity} '{key}' already exists"),
            ),

            // --- Pipeline failures: log details, return a sanitized message ---
            AppError::Pdf(err) => {
                tracing::error!(error = %err, "PDF processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PDF_ERROR",
                    "Failed to generate PDF".to_string(),
                )
            }
            AppError::Storage(StorageError::NotFound(key)) => {
                tracing::warn!(key = %key, "Stored PDF missing");
                (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "Stored PDF not found".to_string(),
                )
            }
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Document storage failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Failed to store or retrieve the document".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::UnknownTemplate(code) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_TEMPLATE",
                format!("Unknown template code '{code}'"),
            ),
            AppError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                "MISSING_REQUIRED_FIELDS",
                format!("Missing required fields: {}", fields.join(", ")),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": {
                "code": code,
                "message": message,
            },
        });
        if let AppError::MissingFields(fields) = &self {
            body["error"]["fields"] = json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}
