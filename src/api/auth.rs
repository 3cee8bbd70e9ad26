//! Token issuance

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::{LoginError, TokenModel};

pub fn router() -> Router<AppState> {
    Router::new().route("/authenticate", post(authenticate))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 200 with a token, or 401 with the error token for any credential problem
/// (missing fields included). Store failures are 500.
async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TokenModel>)> {
    let rejected = (StatusCode::UNAUTHORIZED, Json(TokenModel::error_token()));

    let Ok(Json(LoginRequest {
        email: Some(email),
        password: Some(password),
    })) = payload
    else {
        return Ok(rejected);
    };

    match state.auth.login(&email, &password).await {
        Ok(token) => Ok((StatusCode::OK, Json(token))),
        Err(LoginError::Store(e)) => Err(e),
        Err(LoginError::Token(e)) => Err(ApiError::Internal(e.to_string())),
        Err(e) => {
            tracing::info!(reason = %e, "Login rejected");
            Ok(rejected)
        }
    }
}
