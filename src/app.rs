//! Application state and HTTP router construction.
//!
//! Used by the binary and by the integration tests to build the Axum app.

use std::sync::Arc;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{Method, Uri};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::catalog::CorpusContext;
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::services::AuthService;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Catalog database
    pub db: Database,
    /// Identity database (may be the same pool as `db`)
    pub identity_db: Database,
    pub auth: AuthService,
}

impl AppState {
    pub fn corpus_context(&self) -> CorpusContext {
        CorpusContext {
            untagged_tag_id: self.config.corpus_untagged_tag_id,
        }
    }
}

/// Build the full Axum router with CORS, tracing and a JSON 404 fallback.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    api::router()
        .fallback(not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(%uri, "No route");
    ApiError::NotFound
}
