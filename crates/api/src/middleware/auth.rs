//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use realeagent_core::error::CoreError;
use realeagent_core::roles::can_view_all_documents;
use realeagent_core::types::UserId;
use realeagent_db::repositories::SessionRepo;

use crate::auth::jwt::{hash_token, validate_token};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// The token must carry a valid signature and expiry, and its session must
/// not have been revoked by logout.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    pub role: String,
    /// Session key of the presented token.
    pub token_hash: String,
}

impl AuthUser {
    /// Whether this user may read documents owned by other agents.
    pub fn can_view_all_documents(&self) -> bool {
        can_view_all_documents(&self.role)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let token_hash = hash_token(token);
        let session = SessionRepo::find_active(&state.pool, &token_hash)
            .await
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Session has ended".into()))
            })?;

        if session.user_id != claims.user_id {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Session does not match token".into(),
            )));
        }

        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            token_hash,
        })
    }
}
