//! Genre endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{Editor, JsonBody, NumericId};
use crate::AppState;
use crate::catalog::Genre;
use crate::db::{CreateGenre, GenreInput, UpdateGenre};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/{id}", get(get_genre).put(update_genre).delete(delete_genre))
}

async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(state.db.genres().list().await?))
}

async fn get_genre(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Genre>> {
    let genre = state.db.genres().get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(genre))
}

async fn create_genre(
    State(state): State<AppState>,
    _editor: Editor,
    JsonBody(input): JsonBody<GenreInput>,
) -> ApiResult<(StatusCode, Json<Genre>)> {
    let genre = CreateGenre::try_from(input)?;
    let genres = state.db.genres();
    let genre_id = genres.create(&genre).await?;
    let created = genres.get(genre_id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_genre(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
    JsonBody(input): JsonBody<GenreInput>,
) -> ApiResult<Json<Genre>> {
    let update = UpdateGenre::from_input(input, id)?;
    let genres = state.db.genres();
    if !genres.update(&update).await? {
        return Err(ApiError::NotFound);
    }
    let updated = genres.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

async fn delete_genre(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
) -> ApiResult<StatusCode> {
    if state.db.genres().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
