use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use sandwich_application::AuditLogQuery;
use sandwich_core::{AppError, UserId};
use sandwich_domain::{EffectiveUser, Permission};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{
    AuditLogEntryResponse, GrantPermissionRequest, PermissionsUpdatedResponse,
    UserPermissionGrantResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /auth/permissions/{user_id} - Explicit grant rows for one user.
pub async fn list_grants_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<UserPermissionGrantResponse>>> {
    let grants = state
        .permission_admin_service
        .list_grants(&user, UserId::from_uuid(user_id))
        .await?
        .into_iter()
        .map(UserPermissionGrantResponse::from)
        .collect();

    Ok(Json(grants))
}

/// PUT /auth/permissions/{user_id} - Replace a user's full grant set.
///
/// The body must be `{ "permissions": [...] }` with known permission
/// strings; anything else is a 400.
pub async fn set_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<PermissionsUpdatedResponse>> {
    let values = payload
        .get("permissions")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| AppError::Validation("permissions must be an array".to_owned()))?;

    let permissions = values
        .iter()
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| {
                    AppError::Validation("permissions must be an array of strings".to_owned())
                })
                .and_then(Permission::from_transport)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let target = UserId::from_uuid(user_id);
    state
        .permission_admin_service
        .set_user_permissions(&user, target, permissions.clone())
        .await?;

    Ok(Json(PermissionsUpdatedResponse::new(
        target.to_string(),
        &permissions,
    )))
}

/// POST /auth/permissions/{user_id} - Grant a single permission.
pub async fn grant_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GrantPermissionRequest>,
) -> ApiResult<StatusCode> {
    let permission = Permission::from_transport(payload.permission.as_str())
        .map_err(ApiError::from)?;
    state
        .permission_admin_service
        .grant_permission(&user, UserId::from_uuid(user_id), permission)
        .await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /auth/permissions/{user_id}/{permission} - Revoke one grant.
pub async fn revoke_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path((user_id, permission)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    let permission =
        Permission::from_transport(permission.as_str()).map_err(ApiError::from)?;
    state
        .permission_admin_service
        .revoke_permission(&user, UserId::from_uuid(user_id), permission)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQueryParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// GET /auth/audit-log - Recent administrative audit entries.
pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Query(params): Query<AuditLogQueryParams>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .permission_admin_service
        .list_audit_log(
            &user,
            AuditLogQuery {
                limit: params.limit.unwrap_or(100),
                offset: params.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
