//! Series repository
//!
//! Series reads share the book row shape; the query is rooted at the series
//! table so a series without books still yields one row.

use serde::Deserialize;
use sqlx::SqlitePool;

use super::books::{BookRow, series_query};
use super::{check_path_id, required_text};
use crate::catalog::names::{self, blank_to_none};
use crate::catalog::{Series, aggregate, aggregate_one};
use crate::error::ApiResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInSeries {
    pub book_id: i64,
    pub volume: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInput {
    pub series_id: Option<i64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub price: Option<f64>,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub amazon_url: Option<String>,
    pub books: Option<Vec<BookInSeries>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSeries {
    pub title: String,
    pub subtitle: Option<String>,
    pub price: f64,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub amazon_url: Option<String>,
    pub books: Option<Vec<BookInSeries>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSeries {
    pub series_id: i64,
    pub series: CreateSeries,
}

impl CreateSeries {
    pub fn full_title(&self) -> String {
        names::full_title(&self.title, self.subtitle.as_deref())
    }
}

impl TryFrom<SeriesInput> for CreateSeries {
    type Error = crate::error::ApiError;

    fn try_from(input: SeriesInput) -> ApiResult<Self> {
        Ok(Self {
            title: required_text(input.title, "title")?,
            subtitle: blank_to_none(input.subtitle),
            price: input.price.unwrap_or(0.0),
            isbn10: blank_to_none(input.isbn10),
            isbn13: blank_to_none(input.isbn13),
            amazon_url: blank_to_none(input.amazon_url),
            books: input.books,
        })
    }
}

impl UpdateSeries {
    pub fn from_input(input: SeriesInput, path_id: i64) -> ApiResult<Self> {
        Ok(Self {
            series_id: check_path_id(input.series_id, path_id, "seriesId")?,
            series: CreateSeries::try_from(input)?,
        })
    }
}

pub struct SeriesRepository {
    pool: SqlitePool,
}

impl SeriesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<Series>> {
        let mut conn = self.pool.acquire().await?;
        let sql = series_query("", "s.sortable_title, s.series_id, bs.volume, b.book_id, ");
        let rows: Vec<BookRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(aggregate(&rows, &())?)
    }

    pub async fn get(&self, series_id: i64) -> ApiResult<Option<Series>> {
        let mut conn = self.pool.acquire().await?;
        let sql = series_query("WHERE s.series_id = ?", "bs.volume, b.book_id, ");
        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(series_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(aggregate_one(&rows, &())?)
    }

    /// Insert a series and its book links without a transaction.
    pub async fn create(&self, series: &CreateSeries) -> ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let full_title = series.full_title();

        let series_id = sqlx::query(
            r#"
            INSERT INTO series (title, subtitle, full_title, sortable_title, price, isbn10, isbn13, amazon_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&series.title)
        .bind(&series.subtitle)
        .bind(&full_title)
        .bind(names::sortable_title(&full_title))
        .bind(series.price)
        .bind(&series.isbn10)
        .bind(&series.isbn13)
        .bind(&series.amazon_url)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        if let Some(books) = &series.books {
            insert_books(&mut conn, series_id, books).await?;
        }

        tracing::info!(series_id, title = %series.title, "Created series");
        Ok(series_id)
    }

    /// Update a series; a present `books` list replaces the stored links.
    pub async fn update(&self, update: &UpdateSeries) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let series = &update.series;
        let full_title = series.full_title();

        let result = sqlx::query(
            r#"
            UPDATE series
            SET title = ?, subtitle = ?, full_title = ?, sortable_title = ?, price = ?,
                isbn10 = ?, isbn13 = ?, amazon_url = ?
            WHERE series_id = ?
            "#,
        )
        .bind(&series.title)
        .bind(&series.subtitle)
        .bind(&full_title)
        .bind(names::sortable_title(&full_title))
        .bind(series.price)
        .bind(&series.isbn10)
        .bind(&series.isbn13)
        .bind(&series.amazon_url)
        .bind(update.series_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some(books) = &series.books {
            sqlx::query("DELETE FROM book_series WHERE series_id = ?")
                .bind(update.series_id)
                .execute(&mut *conn)
                .await?;
            insert_books(&mut conn, update.series_id, books).await?;
        }

        tracing::info!(series_id = update.series_id, "Updated series");
        Ok(true)
    }

    pub async fn delete(&self, series_id: i64) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM series WHERE series_id = ?")
            .bind(series_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn insert_books(
    conn: &mut sqlx::SqliteConnection,
    series_id: i64,
    books: &[BookInSeries],
) -> ApiResult<()> {
    for book in books {
        sqlx::query("INSERT INTO book_series (book_id, series_id, volume) VALUES (?, ?, ?)")
            .bind(book.book_id)
            .bind(series_id)
            .bind(book.volume)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use assert_matches::assert_matches;

    #[test]
    fn test_price_defaults_to_zero() {
        let input = SeriesInput {
            title: Some("The Wheel of Time".into()),
            ..Default::default()
        };
        let series = CreateSeries::try_from(input).unwrap();
        assert_eq!(series.price, 0.0);
        assert_eq!(names::sortable_title(&series.full_title()), "Wheel of Time");
    }

    #[test]
    fn test_title_required() {
        assert_matches!(
            CreateSeries::try_from(SeriesInput::default()),
            Err(ApiError::Validation(_))
        );
    }
}
