//! Editions and printings of a book

use serde::Serialize;

use super::aggregate::{MalformedRow, required};
use crate::db::BookRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub version_id: i64,
    pub book_id: i64,
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
    #[serde(rename = "isMMPaperback")]
    pub is_mm_paperback: bool,
    pub is_leatherbound: bool,
    pub is_ebook: bool,
    pub is_hand_bound: bool,
    pub is_textbook: bool,
    pub details_mixed: bool,
    pub notes: Option<String>,
}

impl Version {
    /// Build from the `version_*` columns of a book row. Missing numbers and
    /// flags read as zero/false.
    pub fn from_book_row(row: &BookRow) -> Result<Self, MalformedRow> {
        Ok(Self {
            version_id: required(&row.version_id, "version_id")?,
            book_id: required(&row.book_id, "book_id")?,
            edition: row.version_edition.unwrap_or_default(),
            year: row.version_year,
            publisher: row.version_publisher.clone(),
            location: row.version_location.clone(),
            isbn10: row.version_isbn10.clone(),
            isbn13: row.version_isbn13.clone(),
            price: row.version_price.unwrap_or_default(),
            quantity: row.version_quantity.unwrap_or_default(),
            url: row.version_url.clone(),
            is_hardcover: row.version_is_hardcover.unwrap_or_default(),
            is_paperback: row.version_is_paperback.unwrap_or_default(),
            is_mm_paperback: row.version_is_mm_paperback.unwrap_or_default(),
            is_leatherbound: row.version_is_leatherbound.unwrap_or_default(),
            is_ebook: row.version_is_ebook.unwrap_or_default(),
            is_hand_bound: row.version_is_hand_bound.unwrap_or_default(),
            is_textbook: row.version_is_textbook.unwrap_or_default(),
            details_mixed: row.version_details_mixed.unwrap_or_default(),
            notes: row.version_notes.clone(),
        })
    }
}
