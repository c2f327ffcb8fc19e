use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use sandwich_core::{AppError, UserIdentity};
use sandwich_domain::EffectiveUser;
use tower_sessions::Session;

use crate::dto::UserIdentityResponse;
use crate::error::ApiResult;

/// POST /auth/logout - Drop the current session.
pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/user - The caller's own resolved identity and permission set.
pub async fn me_handler(
    Extension(identity): Extension<UserIdentity>,
    Extension(effective_user): Extension<EffectiveUser>,
) -> ApiResult<Json<UserIdentityResponse>> {
    Ok(Json(UserIdentityResponse::from_identity(
        &identity,
        &effective_user,
    )))
}
