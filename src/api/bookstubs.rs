//! Book stub listing

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::{ListQuery, NumericId, QueryParams};
use crate::AppState;
use crate::catalog::BookStub;
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookstubs", get(list_bookstubs))
        .route("/bookstubs/{id}", get(get_bookstub))
}

async fn list_bookstubs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Vec<BookStub>>> {
    let stubs = state.db.bookstubs().list(query.naming(), query.page()).await?;
    Ok(Json(stubs))
}

async fn get_bookstub(
    State(state): State<AppState>,
    NumericId(id): NumericId,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<BookStub>> {
    let stub = state
        .db
        .bookstubs()
        .get(id, query.naming())
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(stub))
}
