//! Book versions (editions, printings)
//!
//! Versions are written only as part of a book; reads go through the book
//! query's `version_*` columns.

use serde::Deserialize;
use sqlx::SqliteConnection;

use crate::catalog::names::blank_to_none;
use crate::error::ApiResult;

/// Version request body. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInput {
    pub edition: Option<i64>,
    pub year: Option<i64>,
    pub publisher: Option<String>,
    pub location: Option<String>,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub url: Option<String>,
    #[serde(default)]
    pub is_hardcover: bool,
    #[serde(default)]
    pub is_paperback: bool,
    #[serde(default, rename = "isMMPaperback")]
    pub is_mm_paperback: bool,
    #[serde(default)]
    pub is_leatherbound: bool,
    #[serde(default)]
    pub is_ebook: bool,
    #[serde(default)]
    pub is_hand_bound: bool,
    #[serde(default)]
    pub is_textbook: bool,
    #[serde(default)]
    pub details_mixed: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateVersion {
    pub edition: i64,
    pub year: Option<i64>,
    pub publisher: Option<String>,
    pub location: Option<String>,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub url: Option<String>,
    pub is_hardcover: bool,
    pub is_paperback: bool,
    pub is_mm_paperback: bool,
    pub is_leatherbound: bool,
    pub is_ebook: bool,
    pub is_hand_bound: bool,
    pub is_textbook: bool,
    pub details_mixed: bool,
    pub notes: Option<String>,
}

impl From<VersionInput> for CreateVersion {
    fn from(input: VersionInput) -> Self {
        Self {
            edition: input.edition.unwrap_or(1),
            year: input.year,
            publisher: blank_to_none(input.publisher),
            location: blank_to_none(input.location),
            isbn10: blank_to_none(input.isbn10),
            isbn13: blank_to_none(input.isbn13),
            price: input.price.unwrap_or(0.0),
            quantity: input.quantity.unwrap_or(1),
            url: blank_to_none(input.url),
            is_hardcover: input.is_hardcover,
            is_paperback: input.is_paperback,
            is_mm_paperback: input.is_mm_paperback,
            is_leatherbound: input.is_leatherbound,
            is_ebook: input.is_ebook,
            is_hand_bound: input.is_hand_bound,
            is_textbook: input.is_textbook,
            details_mixed: input.details_mixed,
            notes: blank_to_none(input.notes),
        }
    }
}

pub(super) async fn insert(
    conn: &mut SqliteConnection,
    book_id: i64,
    version: &CreateVersion,
) -> ApiResult<i64> {
    let version_id = sqlx::query(
        r#"
        INSERT INTO versions (
            book_id, edition, year, publisher, location, isbn10, isbn13, price, quantity, url,
            is_hardcover, is_paperback, is_mm_paperback, is_leatherbound, is_ebook,
            is_hand_bound, is_textbook, details_mixed, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book_id)
    .bind(version.edition)
    .bind(version.year)
    .bind(&version.publisher)
    .bind(&version.location)
    .bind(&version.isbn10)
    .bind(&version.isbn13)
    .bind(version.price)
    .bind(version.quantity)
    .bind(&version.url)
    .bind(version.is_hardcover)
    .bind(version.is_paperback)
    .bind(version.is_mm_paperback)
    .bind(version.is_leatherbound)
    .bind(version.is_ebook)
    .bind(version.is_hand_bound)
    .bind(version.is_textbook)
    .bind(version.details_mixed)
    .bind(&version.notes)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(version_id)
}

pub(super) async fn delete_for_book(conn: &mut SqliteConnection, book_id: i64) -> ApiResult<u64> {
    let result = sqlx::query("DELETE FROM versions WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
