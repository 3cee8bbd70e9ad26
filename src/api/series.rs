//! Series endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{Editor, JsonBody, NumericId};
use crate::AppState;
use crate::catalog::Series;
use crate::db::{CreateSeries, SeriesInput, UpdateSeries};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/series", get(list_series).post(create_series))
        .route("/series/{id}", get(get_series).put(update_series).delete(delete_series))
}

async fn list_series(State(state): State<AppState>) -> ApiResult<Json<Vec<Series>>> {
    Ok(Json(state.db.series().list().await?))
}

async fn get_series(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Series>> {
    let series = state.db.series().get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(series))
}

async fn create_series(
    State(state): State<AppState>,
    _editor: Editor,
    JsonBody(input): JsonBody<SeriesInput>,
) -> ApiResult<(StatusCode, Json<Series>)> {
    let series = CreateSeries::try_from(input)?;
    let repo = state.db.series();
    let series_id = repo.create(&series).await?;
    let created = repo.get(series_id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_series(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
    JsonBody(input): JsonBody<SeriesInput>,
) -> ApiResult<Json<Series>> {
    let update = UpdateSeries::from_input(input, id)?;
    let repo = state.db.series();
    if !repo.update(&update).await? {
        return Err(ApiError::NotFound);
    }
    let updated = repo.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

async fn delete_series(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
) -> ApiResult<StatusCode> {
    if state.db.series().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
