//! Request failure kinds and their HTTP mapping

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::catalog::MalformedRow;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The data store could not be reached.
    #[error("database connection failed: {0}")]
    ConnectionFailure(String),

    /// A statement was rejected before execution.
    #[error("statement preparation failed: {0}")]
    StatementPrepare(String),

    /// A prepared statement failed while executing.
    #[error("database error: {0}")]
    UnknownDatabase(String),

    #[error("{0}")]
    Validation(String),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error(transparent)]
    MalformedRow(#[from] MalformedRow),

    /// Any other server-side fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::ConnectionFailure(_)
            | Self::StatementPrepare(_)
            | Self::UnknownDatabase(_)
            | Self::MalformedRow(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailure(_) => "connection_failure",
            Self::StatementPrepare(_) => "statement_prepare",
            Self::UnknownDatabase(_) => "unknown_database",
            Self::Validation(_) => "validation",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::MalformedRow(_) => "malformed_row",
            Self::Internal(_) => "internal",
        }
    }
}

/// SQLite reports compile-time problems (bad SQL, missing tables or
/// columns) through the same error type as execution failures.
fn is_prepare_failure(message: &str) -> bool {
    message.contains("syntax error") || message.contains("no such ")
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => Self::ConnectionFailure(err.to_string()),
            sqlx::Error::Database(ref db) if is_prepare_failure(db.message()) => {
                Self::StatementPrepare(db.message().to_string())
            }
            sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
                Self::StatementPrepare(err.to_string())
            }
            other => Self::UnknownDatabase(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("title is required").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(MalformedRow::new("book_id")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlx_errors_map_to_kinds() {
        assert_matches!(ApiError::from(sqlx::Error::PoolTimedOut), ApiError::ConnectionFailure(_));
        assert_matches!(
            ApiError::from(sqlx::Error::ColumnNotFound("title".into())),
            ApiError::StatementPrepare(_)
        );
        assert_matches!(ApiError::from(sqlx::Error::RowNotFound), ApiError::UnknownDatabase(_));
    }

    #[test]
    fn test_prepare_failure_messages() {
        assert!(is_prepare_failure("near \"SELEC\": syntax error"));
        assert!(is_prepare_failure("no such table: bookz"));
        assert!(!is_prepare_failure("FOREIGN KEY constraint failed"));
    }
}
