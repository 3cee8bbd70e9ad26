//! Tag endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{Editor, JsonBody, NumericId};
use crate::AppState;
use crate::catalog::Tag;
use crate::db::{CreateTag, TagInput, UpdateTag};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.db.tags().list().await?))
}

async fn get_tag(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Tag>> {
    let tag = state.db.tags().get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(tag))
}

async fn create_tag(
    State(state): State<AppState>,
    _editor: Editor,
    JsonBody(input): JsonBody<TagInput>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag = CreateTag::try_from(input)?;
    let tags = state.db.tags();
    let tag_id = tags.create(&tag).await?;
    let created = tags.get(tag_id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_tag(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
    JsonBody(input): JsonBody<TagInput>,
) -> ApiResult<Json<Tag>> {
    let update = UpdateTag::from_input(input, id)?;
    let tags = state.db.tags();
    if !tags.update(&update).await? {
        return Err(ApiError::NotFound);
    }
    let updated = tags.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

async fn delete_tag(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
) -> ApiResult<StatusCode> {
    if state.db.tags().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
