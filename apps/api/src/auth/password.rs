use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sandwich_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::dto::{GenericMessageResponse, LoginRequest, RegisterRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// POST /auth/register - Create a new account with email+password.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    state
        .user_service
        .register(sandwich_application::RegisterParams {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GenericMessageResponse {
            message: "account created, you can sign in now".to_owned(),
        }),
    ))
}

/// POST /auth/login - Authenticate with email+password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let user = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    let identity = UserIdentity::new(
        user.id,
        user.email,
        user.first_name,
        user.last_name,
        user.role,
    );

    // Fresh session id on privilege change (OWASP session fixation).
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, identity.clone())
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session: {error}")))?;

    let effective_user = state.authorization_service.effective_user(&identity).await?;

    Ok(Json(UserIdentityResponse::from_identity(
        &identity,
        &effective_user,
    )))
}
