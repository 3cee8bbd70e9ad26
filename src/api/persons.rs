//! Person endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::{Editor, JsonBody, NumericId};
use crate::AppState;
use crate::catalog::Person;
use crate::db::{CreatePerson, PersonInput, UpdatePerson};
use crate::error::{ApiError, ApiResult};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/persons", get(list_persons).post(create_person))
        .route("/persons/{id}", get(get_person).put(update_person).delete(delete_person))
}

async fn list_persons(State(state): State<AppState>) -> ApiResult<Json<Vec<Person>>> {
    Ok(Json(state.db.persons().list().await?))
}

async fn get_person(State(state): State<AppState>, NumericId(id): NumericId) -> ApiResult<Json<Person>> {
    let person = state.db.persons().get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(person))
}

async fn create_person(
    State(state): State<AppState>,
    _editor: Editor,
    JsonBody(input): JsonBody<PersonInput>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let person = CreatePerson::try_from(input)?;
    let persons = state.db.persons();
    let person_id = persons.create(&person).await?;
    let created = persons.get(person_id).await?.ok_or(ApiError::NotFound)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_person(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
    JsonBody(input): JsonBody<PersonInput>,
) -> ApiResult<Json<Person>> {
    let update = UpdatePerson::from_input(input, id)?;
    let persons = state.db.persons();
    if !persons.update(&update).await? {
        return Err(ApiError::NotFound);
    }
    let updated = persons.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

async fn delete_person(
    State(state): State<AppState>,
    _editor: Editor,
    NumericId(id): NumericId,
) -> ApiResult<StatusCode> {
    if state.db.persons().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
