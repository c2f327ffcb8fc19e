use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use sandwich_core::UserIdentity;
use sandwich_domain::{EffectiveUser, MessageChannel};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::{MessageResponse, PostMessageRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub limit: Option<usize>,
}

pub async fn list_channel_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(channel): Path<String>,
    Query(query): Query<ChannelQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let channel = MessageChannel::from_str(channel.as_str()).map_err(ApiError::from)?;
    let messages = state
        .message_service
        .list_channel(&user, channel, query.limit.unwrap_or(100))
        .await?
        .into_iter()
        .map(MessageResponse::from)
        .collect();

    Ok(Json(messages))
}

pub async fn post_message_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(user): Extension<EffectiveUser>,
    Path(channel): Path<String>,
    Json(payload): Json<PostMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let channel = MessageChannel::from_str(channel.as_str()).map_err(ApiError::from)?;
    let sender_name = format!("{} {}", identity.first_name(), identity.last_name());
    let message = state
        .message_service
        .post_message(&user, channel, sender_name.trim(), &payload.body)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

pub async fn delete_message_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(message_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.message_service.delete_message(&user, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
