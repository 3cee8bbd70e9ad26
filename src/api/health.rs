//! Health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub catalog: bool,
    pub identity: bool,
}

/// Health check - always returns OK if the server is running
async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check - both databases answer a trivial query
async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let catalog = state.db.ping().await.is_ok();
    let identity = state.identity_db.ping().await.is_ok();
    let ready = catalog && identity;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyResponse { ready, catalog, identity }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
