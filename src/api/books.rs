//! Book endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{Editor, JsonBody, ListQuery, NumericId, QueryParams};
use crate::AppState;
use crate::catalog::Book;
use crate::db::{BookInput, CreateBook, UpdateBook};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book).put(update_book).delete(delete_book))
}

async fn list_books(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    Ok(Json(state.db.books().list(query.page()).await?))
}

async fn get_book(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Book>> {
    let book = state.db.books().get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(book))
}

async fn create_book(
    State(state): State<AppState>,
    _editor: Editor,
    JsonBody(input): JsonBody<BookInput>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = CreateBook::try_from(input)?;
    let books = state.db.books();
    let book_id = books.create(&book).await?;
    let created = books.get(book_id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_book(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
    JsonBody(input): JsonBody<BookInput>,
) -> ApiResult<Json<Book>> {
    let update = UpdateBook::from_input(input, id)?;
    let books = state.db.books();
    if !books.update(&update).await? {
        return Err(ApiError::NotFound);
    }
    let updated = books.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

async fn delete_book(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
) -> ApiResult<StatusCode> {
    if state.db.books().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
