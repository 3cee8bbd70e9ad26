//! Series
//!
//! A series lists its books as [`BookWithoutSeries`], each carrying its
//! volume within the series. A book lists its series as
//! [`SeriesWithoutBooks`]. Neither shape points back at the other.

use serde::Serialize;

use super::aggregate::{Aggregate, Keyed, MalformedRow, required, required_str};
use super::book::BookWithoutSeries;
use crate::db::BookRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesWithoutBooks {
    pub series_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub price: f64,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub amazon_url: Option<String>,
    pub volume: Option<i64>,
}

impl SeriesWithoutBooks {
    pub fn from_book_row(row: &BookRow) -> Result<Self, MalformedRow> {
        Ok(Self {
            series_id: required(&row.series_id, "series_id")?,
            title: required_str(&row.series_title, "series_title")?,
            subtitle: row.series_subtitle.clone(),
            price: row.series_price.unwrap_or_default(),
            isbn13: row.series_isbn13.clone(),
            isbn10: row.series_isbn10.clone(),
            amazon_url: row.series_amazon_url.clone(),
            volume: row.volume,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub series_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub price: f64,
    pub isbn13: Option<String>,
    pub isbn10: Option<String>,
    pub amazon_url: Option<String>,
    pub books: Keyed<i64, BookWithoutSeries>,
}

impl Aggregate for Series {
    type Key = i64;
    type Row = BookRow;
    type Context = ();

    fn root_key(row: &BookRow) -> Result<i64, MalformedRow> {
        required(&row.series_id, "series_id")
    }

    fn new(row: &BookRow, _: &()) -> Result<Self, MalformedRow> {
        let header = SeriesWithoutBooks::from_book_row(row)?;
        Ok(Self {
            series_id: header.series_id,
            title: header.title,
            subtitle: header.subtitle,
            price: header.price,
            isbn13: header.isbn13,
            isbn10: header.isbn10,
            amazon_url: header.amazon_url,
            books: Keyed::new(),
        })
    }

    fn fold(&mut self, row: &BookRow, _: &()) -> Result<(), MalformedRow> {
        match self
            .books
            .upsert(row.book_id, || BookWithoutSeries::new(row, row.volume))?
        {
            Some(book) => book.fold(row),
            None => Ok(()),
        }
    }
}

/// Series reference carried by a book stub.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStub {
    pub series_id: i64,
    pub title: String,
    pub volume: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aggregate::aggregate;
    use crate::catalog::book::tests::{book_row, with_author};
    use pretty_assertions::assert_eq;

    fn in_series(mut row: BookRow, series_id: i64, volume: i64) -> BookRow {
        row.series_id = Some(series_id);
        row.series_title = Some(format!("Series {series_id}"));
        row.volume = Some(volume);
        row
    }

    #[test]
    fn test_books_nest_with_their_volume() {
        let rows = vec![
            in_series(with_author(book_row(1, "First"), 7, "Ursula", "Le Guin"), 3, 1),
            in_series(with_author(book_row(2, "Second"), 7, "Ursula", "Le Guin"), 3, 2),
            in_series(with_author(book_row(2, "Second"), 8, "Other", "Writer"), 3, 2),
        ];
        let series: Vec<Series> = aggregate(&rows, &()).unwrap();
        assert_eq!(series.len(), 1);

        let books: Vec<&BookWithoutSeries> = series[0].books.values().collect();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].volume, Some(1));
        assert_eq!(books[1].volume, Some(2));
        assert_eq!(books[1].authors.len(), 2);
    }

    #[test]
    fn test_empty_series_has_no_books() {
        let row = BookRow {
            series_id: Some(4),
            series_title: Some("Planned".into()),
            ..Default::default()
        };
        let series: Vec<Series> = aggregate(&[row], &()).unwrap();
        assert!(series[0].books.is_empty());
        assert_eq!(series[0].price, 0.0);
    }

    #[test]
    fn test_series_json_has_no_volume_at_root() {
        let rows = vec![in_series(book_row(1, "First"), 3, 1)];
        let series: Vec<Series> = aggregate(&rows, &()).unwrap();
        let json = serde_json::to_value(&series[0]).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["seriesId", "title", "subtitle", "price", "isbn13", "isbn10", "amazonUrl", "books"]
        );
        assert_eq!(json["books"][0]["volume"], 1);
        assert!(json["books"][0].get("series").is_none());
    }
}
