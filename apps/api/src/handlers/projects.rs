use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_application::ProjectInput;
use sandwich_core::AppError;
use sandwich_domain::{EffectiveUser, ProjectStatus};
use uuid::Uuid;

use crate::dto::{ProjectResponse, SaveProjectRequest};
use crate::error::ApiResult;
use crate::state::AppState;

fn to_input(payload: SaveProjectRequest) -> Result<ProjectInput, AppError> {
    let status = match payload.status.as_deref() {
        Some(value) => ProjectStatus::from_str(value)?,
        None => ProjectStatus::Available,
    };

    Ok(ProjectInput {
        title: payload.title,
        description: payload.description,
        status,
        assignees: payload.assignees.unwrap_or_default(),
        due_date: payload.due_date,
    })
}

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects(&user)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state.project_service.get_project(&user, project_id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Json(payload): Json<SaveProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .create_project(&user, to_input(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<SaveProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_project(&user, project_id, to_input(payload)?)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.project_service.delete_project(&user, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
