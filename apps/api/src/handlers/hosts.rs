use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_application::HostInput;
use sandwich_domain::EffectiveUser;
use uuid::Uuid;

use crate::dto::{HostResponse, SaveHostRequest};
use crate::error::ApiResult;
use crate::state::AppState;

fn to_input(payload: SaveHostRequest) -> HostInput {
    HostInput {
        name: payload.name,
        address: payload.address,
        contact_name: payload.contact_name.unwrap_or_default(),
        contact_phone: payload.contact_phone.unwrap_or_default(),
        is_active: payload.is_active.unwrap_or(true),
        notes: payload.notes,
    }
}

pub async fn list_hosts_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<HostResponse>>> {
    let hosts = state
        .host_service
        .list_hosts(&user)
        .await?
        .into_iter()
        .map(HostResponse::from)
        .collect();

    Ok(Json(hosts))
}

pub async fn get_host_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(host_id): Path<Uuid>,
) -> ApiResult<Json<HostResponse>> {
    let host = state.host_service.get_host(&user, host_id).await?;
    Ok(Json(HostResponse::from(host)))
}

pub async fn create_host_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Json(payload): Json<SaveHostRequest>,
) -> ApiResult<(StatusCode, Json<HostResponse>)> {
    let host = state.host_service.create_host(&user, to_input(payload)).await?;
    Ok((StatusCode::CREATED, Json(HostResponse::from(host))))
}

pub async fn update_host_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(host_id): Path<Uuid>,
    Json(payload): Json<SaveHostRequest>,
) -> ApiResult<Json<HostResponse>> {
    let host = state
        .host_service
        .update_host(&user, host_id, to_input(payload))
        .await?;

    Ok(Json(HostResponse::from(host)))
}

pub async fn delete_host_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(host_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.host_service.delete_host(&user, host_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
