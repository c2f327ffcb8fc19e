use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_core::UserId;
use sandwich_domain::{EffectiveUser, Role};
use uuid::Uuid;

use crate::dto::{UpdateUserRoleRequest, UserSummaryResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<UserSummaryResponse>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserSummaryResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn update_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> ApiResult<StatusCode> {
    let role = Role::from_transport(payload.role.as_str()).map_err(ApiError::from)?;
    state
        .user_service
        .update_role(&user, UserId::from_uuid(user_id), role)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .user_service
        .deactivate_user(&user, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
