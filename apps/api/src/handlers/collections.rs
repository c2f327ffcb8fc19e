use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use sandwich_application::CollectionInput;
use sandwich_domain::{EffectiveUser, GroupCollection};
use uuid::Uuid;

use crate::dto::{CollectionResponse, SaveCollectionRequest};
use crate::error::ApiResult;
use crate::state::AppState;

fn to_input(payload: SaveCollectionRequest) -> CollectionInput {
    CollectionInput {
        host_name: payload.host_name,
        collection_date: payload.collection_date,
        individual_sandwiches: payload.individual_sandwiches,
        group_collections: payload
            .group_collections
            .unwrap_or_default()
            .into_iter()
            .map(GroupCollection::from)
            .collect(),
    }
}

pub async fn list_collections_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
) -> ApiResult<Json<Vec<CollectionResponse>>> {
    let collections = state
        .collection_service
        .list_collections(&user)
        .await?
        .into_iter()
        .map(CollectionResponse::from)
        .collect();

    Ok(Json(collections))
}

pub async fn get_collection_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<Json<CollectionResponse>> {
    let collection = state
        .collection_service
        .get_collection(&user, collection_id)
        .await?;

    Ok(Json(CollectionResponse::from(collection)))
}

pub async fn create_collection_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Json(payload): Json<SaveCollectionRequest>,
) -> ApiResult<(StatusCode, Json<CollectionResponse>)> {
    let collection = state
        .collection_service
        .create_collection(&user, to_input(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(CollectionResponse::from(collection))))
}

pub async fn update_collection_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(collection_id): Path<Uuid>,
    Json(payload): Json<SaveCollectionRequest>,
) -> ApiResult<Json<CollectionResponse>> {
    let collection = state
        .collection_service
        .update_collection(&user, collection_id, to_input(payload))
        .await?;

    Ok(Json(CollectionResponse::from(collection)))
}

pub async fn delete_collection_handler(
    State(state): State<AppState>,
    Extension(user): Extension<EffectiveUser>,
    Path(collection_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .collection_service
        .delete_collection(&user, collection_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
