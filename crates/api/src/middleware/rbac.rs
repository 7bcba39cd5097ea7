//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use realeagent_core::error::CoreError;
use realeagent_core::roles::{ROLE_ADMIN, ROLE_BROKER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `broker` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn oversight(RequireBroker(user): RequireBroker) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireBroker(pub AuthUser);

impl FromRequestParts<AppState> for RequireBroker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_BROKER && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Broker or Admin role required".into(),
            )));
        }
        Ok(RequireBroker(user))
    }
}
