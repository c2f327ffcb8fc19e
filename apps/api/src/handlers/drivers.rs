use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_application::DriverInput;
use sandwich_core::AppError;
use sandwich_domain::EffectiveUser;
use uuid::Uuid;

use crate::dto::{DriverResponse, SaveDriverRequest};
use crate::error::ApiResult;
use crate::state::AppState;

fn to_input(payload: SaveDriverRequest) -> Result<DriverInput, AppError> {
    let host_id = payload
        .host_id
        .as_deref()
        .map(|value| {
            Uuid::parse_str(value)
                .map_err(|error| AppError::Validation(format!("invalid host id: {error}")))
        })
        .transpose()?;

    Ok(DriverInput {
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        vehicle_notes: payload.vehicle_notes,
        host_id,
        is_active: payload.is_active.unwrap_or(true),
    })
}

pub async fn list_drivers_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<DriverResponse>>> {
    let drivers = state
        .driver_service
        .list_drivers(&user)
        .await?
        .into_iter()
        .map(DriverResponse::from)
        .collect();

    Ok(Json(drivers))
}

pub async fn get_driver_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(driver_id): Path<Uuid>,
) -> ApiResult<Json<DriverResponse>> {
    let driver = state.driver_service.get_driver(&user, driver_id).await?;
    Ok(Json(DriverResponse::from(driver)))
}

pub async fn create_driver_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Json(payload): Json<SaveDriverRequest>,
) -> ApiResult<(StatusCode, Json<DriverResponse>)> {
    let driver = state
        .driver_service
        .create_driver(&user, to_input(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(DriverResponse::from(driver))))
}

pub async fn update_driver_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<SaveDriverRequest>,
) -> ApiResult<Json<DriverResponse>> {
    let driver = state
        .driver_service
        .update_driver(&user, driver_id, to_input(payload)?)
        .await?;

    Ok(Json(DriverResponse::from(driver)))
}

pub async fn delete_driver_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(driver_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.driver_service.delete_driver(&user, driver_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
