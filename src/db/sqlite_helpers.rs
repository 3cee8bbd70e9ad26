//! SQLite helper utilities
//!
//! Connection options for the catalog and identity databases, plus the few
//! conversions SQLite needs for values it has no native type for.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};

// ============================================================================
// Connection Helpers
// ============================================================================

/// Build connect options from either a `sqlite:` URL or a bare file path.
///
/// The file is created on first use and foreign keys are enforced so that
/// deleting a book or person cascades to its link rows.
pub fn connect_options(url_or_path: &str) -> Result<SqliteConnectOptions> {
    let options = if url_or_path.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(url_or_path)
            .with_context(|| format!("Invalid SQLite URL '{}'", url_or_path))?
    } else {
        SqliteConnectOptions::new().filename(url_or_path)
    };

    Ok(options
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal))
}

// ============================================================================
// Timestamp Helpers (stored as ISO8601 TEXT in SQLite)
// ============================================================================

/// Get current UTC timestamp as ISO8601 string for SQLite
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_url_forms() {
        let from_path = connect_options("./data/catalog.db").unwrap();
        assert_eq!(from_path.get_filename().to_str(), Some("./data/catalog.db"));

        let from_url = connect_options("sqlite://data/catalog.db").unwrap();
        assert!(from_url.get_filename().ends_with("catalog.db"));
    }

    #[test]
    fn test_now_is_rfc3339() {
        let now = now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
