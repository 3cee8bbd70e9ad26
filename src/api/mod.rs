//! API route definitions
//!
//! One router per catalog resource, merged at the root. Mutating routes take
//! an [`Editor`] extractor, which rejects requests without an edit-capable
//! bearer token before the handler runs.

pub mod auth;
pub mod books;
pub mod bookstubs;
pub mod corpora;
pub mod genres;
pub mod health;
pub mod persons;
pub mod series;
pub mod tags;

use axum::Router;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::AppState;
use crate::catalog::{NamingPolicy, Page};
use crate::error::ApiError;
use crate::services::Capability;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(bookstubs::router())
        .merge(books::router())
        .merge(persons::router())
        .merge(genres::router())
        .merge(tags::router())
        .merge(series::router())
        .merge(corpora::router())
}

// ============================================================================
// Extractors
// ============================================================================

/// JSON request body; malformed bodies are 400 with the usual error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string; unparsable values are 400.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Resource id from the `{id}` path segment. Anything but ASCII digits is a
/// 404, as if the route did not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for NumericId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;
        parse_id(&raw).map(NumericId).ok_or(ApiError::NotFound)
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Proof that the request carries an edit-capable token.
#[derive(Debug, Clone, Copy)]
pub struct Editor;

impl FromRequestParts<AppState> for Editor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.auth.is_authenticated(&parts.headers, Capability::Edit) {
            Ok(Editor)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// `start`, `num` and `fulltext` list parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub start: Option<usize>,
    pub num: Option<usize>,
    pub fulltext: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.start.unwrap_or(0), self.num.unwrap_or(0))
    }

    pub fn naming(&self) -> NamingPolicy {
        NamingPolicy::from_flag(self.fulltext.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_digits_only() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("007"), Some(7));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("+3"), None);
        assert_eq!(parse_id("12a"), None);
        assert_eq!(parse_id("99999999999999999999"), None);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert!(query.page().is_unbounded());
        assert!(!query.naming().full_text);

        let query = ListQuery {
            start: Some(3),
            num: Some(2),
            fulltext: Some("1".into()),
        };
        assert_eq!(query.page(), Page::new(3, 2));
        assert!(query.naming().full_text);
    }
}
