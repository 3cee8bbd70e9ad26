//! Author corpus endpoints

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::NumericId;
use crate::AppState;
use crate::catalog::Corpus;
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/corpora", get(list_corpora))
        .route("/corpora/{id}", get(get_corpus))
}

async fn list_corpora(State(state): State<AppState>) -> ApiResult<Json<Vec<Corpus>>> {
    let ctx = state.corpus_context();
    Ok(Json(state.db.corpora().list(&ctx).await?))
}

async fn get_corpus(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Corpus>> {
    let ctx = state.corpus_context();
    let corpus = state.db.corpora().get(id, &ctx).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(corpus))
}
