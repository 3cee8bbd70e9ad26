//! Database connection and repositories
//!
//! One repository per catalog resource. Each repository call acquires a
//! single pooled connection and releases it when the call returns.

pub mod books;
pub mod bookstubs;
pub mod corpora;
pub mod genres;
pub mod persons;
pub mod series;
pub mod sqlite_helpers;
pub mod tags;
pub mod users;
pub mod versions;

use std::time::Duration;

use anyhow::Result;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::error::{ApiError, ApiResult};

pub use books::{BookInput, BookRepository, BookRow, CreateBook, GenreInBook, SeriesInBook, UpdateBook};
pub use bookstubs::{BookStubRepository, BookStubRow};
pub use corpora::{CoauthorRow, CorpusRepository, CorpusRow};
pub use genres::{CreateGenre, GenreInput, GenreRepository, GenreRow, UpdateGenre};
pub use persons::{CreatePerson, PersonInput, PersonRecord, PersonRepository, UpdatePerson};
pub use series::{BookInSeries, CreateSeries, SeriesInput, SeriesRepository, UpdateSeries};
pub use tags::{CreateTag, TagInput, TagRepository, UpdateTag};
pub use users::{CreateUser, IdentityRow, UsersRepository};
pub use versions::{CreateVersion, VersionInput};

/// Database wrapper providing connection pool access
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database wrapper from an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on a SQLite file or `sqlite:` URL
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = sqlite_helpers::connect_options(url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        tracing::debug!(url, max_connections, "Opened SQLite pool");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    pub fn bookstubs(&self) -> BookStubRepository {
        BookStubRepository::new(self.pool.clone())
    }

    pub fn corpora(&self) -> CorpusRepository {
        CorpusRepository::new(self.pool.clone())
    }

    pub fn genres(&self) -> GenreRepository {
        GenreRepository::new(self.pool.clone())
    }

    pub fn persons(&self) -> PersonRepository {
        PersonRepository::new(self.pool.clone())
    }

    pub fn series(&self) -> SeriesRepository {
        SeriesRepository::new(self.pool.clone())
    }

    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Round-trip a trivial statement for readiness probes.
    pub async fn ping(&self) -> ApiResult<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok(())
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// ============================================================================
// Input validation shared by the write records
// ============================================================================

/// Non-blank text, trimmed.
pub(crate) fn required_text(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

/// The id carried in an update body must be positive and match the path.
pub(crate) fn check_path_id(body_id: Option<i64>, path_id: i64, field: &str) -> ApiResult<i64> {
    match body_id {
        Some(id) if id > 0 && id == path_id => Ok(id),
        Some(id) if id > 0 => Err(ApiError::validation(format!(
            "{field} {id} does not match the resource id {path_id}"
        ))),
        _ => Err(ApiError::validation(format!("{field} must be a positive integer"))),
    }
}
