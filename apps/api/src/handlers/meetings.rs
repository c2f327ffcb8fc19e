use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_application::MeetingInput;
use sandwich_core::AppError;
use sandwich_domain::{EffectiveUser, MeetingStatus};
use uuid::Uuid;

use crate::dto::{MeetingResponse, SaveMeetingRequest};
use crate::error::ApiResult;
use crate::state::AppState;

fn to_input(payload: SaveMeetingRequest) -> Result<MeetingInput, AppError> {
    let status = match payload.status.as_deref() {
        Some(value) => MeetingStatus::from_str(value)?,
        None => MeetingStatus::Planned,
    };

    Ok(MeetingInput {
        title: payload.title,
        scheduled_at: payload.scheduled_at,
        meeting_type: payload.meeting_type.unwrap_or_else(|| "committee".to_owned()),
        agenda: payload.agenda,
        minutes: payload.minutes,
        status,
    })
}

pub async fn list_meetings_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<MeetingResponse>>> {
    let meetings = state
        .meeting_service
        .list_meetings(&user)
        .await?
        .into_iter()
        .map(MeetingResponse::from)
        .collect();

    Ok(Json(meetings))
}

pub async fn get_meeting_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(meeting_id): Path<Uuid>,
) -> ApiResult<Json<MeetingResponse>> {
    let meeting = state.meeting_service.get_meeting(&user, meeting_id).await?;
    Ok(Json(MeetingResponse::from(meeting)))
}

pub async fn schedule_meeting_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Json(payload): Json<SaveMeetingRequest>,
) -> ApiResult<(StatusCode, Json<MeetingResponse>)> {
    let meeting = state
        .meeting_service
        .schedule_meeting(&user, to_input(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(MeetingResponse::from(meeting))))
}

pub async fn update_meeting_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(meeting_id): Path<Uuid>,
    Json(payload): Json<SaveMeetingRequest>,
) -> ApiResult<Json<MeetingResponse>> {
    let meeting = state
        .meeting_service
        .update_meeting(&user, meeting_id, to_input(payload)?)
        .await?;

    Ok(Json(MeetingResponse::from(meeting)))
}
