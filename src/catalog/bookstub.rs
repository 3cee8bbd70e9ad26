//! Book stubs: the lightweight listing shape
//!
//! Authors collapse into one display string whose form depends on the
//! [`NamingPolicy`] of the request.

use serde::{Serialize, Serializer};

use super::aggregate::{Aggregate, Keyed, MalformedRow, required, required_str};
use super::genre::{Genre, GenreColumns};
use super::names;
use super::series::SeriesStub;
use crate::db::BookStubRow;

/// How author names are rendered in a stub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingPolicy {
    /// `false`: "J. Smith". `true`: "Dr. John Smith, PhD".
    pub full_text: bool,
}

impl NamingPolicy {
    /// Interpret a `fulltext` query value. Absent, empty, `0`, `false` and
    /// `no` select the abbreviated form.
    pub fn from_flag(value: Option<&str>) -> Self {
        let full_text = match value.map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(v) => !(v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no")),
        };
        Self { full_text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStub {
    pub book_id: i64,
    /// Full title of the book.
    pub title: String,
    #[serde(serialize_with = "serialize_author_list")]
    pub authors: Keyed<i64, String>,
    pub genres: Keyed<i64, Genre>,
    pub price: f64,
    pub series: Keyed<i64, SeriesStub>,
}

fn serialize_author_list<S: Serializer>(
    authors: &Keyed<i64, String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let names: Vec<&String> = authors.values().collect();
    serializer.serialize_str(&names::join_names(&names))
}

impl BookStubRow {
    fn genre(&self) -> GenreColumns<'_> {
        GenreColumns {
            genre_id: self.genre_id,
            name: &self.genre_name,
            short_name: &self.genre_short_name,
            tag_id: self.tag_id,
            tag_name: &self.tag_name,
        }
    }
}

impl Aggregate for BookStub {
    type Key = i64;
    type Row = BookStubRow;
    type Context = NamingPolicy;

    fn root_key(row: &BookStubRow) -> Result<i64, MalformedRow> {
        required(&row.book_id, "book_id")
    }

    fn new(row: &BookStubRow, _: &NamingPolicy) -> Result<Self, MalformedRow> {
        Ok(Self {
            book_id: required(&row.book_id, "book_id")?,
            title: required_str(&row.full_title, "full_title")?,
            authors: Keyed::new(),
            genres: Keyed::new(),
            price: row.price.unwrap_or_default(),
            series: Keyed::new(),
        })
    }

    fn fold(&mut self, row: &BookStubRow, policy: &NamingPolicy) -> Result<(), MalformedRow> {
        self.authors.insert_new(row.person_id, || {
            Ok(names::format_author(
                &required_str(&row.last_name, "last_name")?,
                row.first_and_middle_names.as_deref(),
                row.titles.as_deref(),
                row.credentials.as_deref(),
                policy.full_text,
            ))
        })?;

        row.genre().fold_into(&mut self.genres)?;

        self.series.insert_new(row.series_id, || {
            Ok(SeriesStub {
                series_id: required(&row.series_id, "series_id")?,
                title: required_str(&row.series_title, "series_title")?,
                volume: row.series_volume.unwrap_or_default(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aggregate::{aggregate, aggregate_one};
    use crate::catalog::pagination::{Page, aggregate_page};
    use pretty_assertions::assert_eq;

    fn stub_row(book_id: i64) -> BookStubRow {
        BookStubRow {
            book_id: Some(book_id),
            full_title: Some(format!("Book {book_id}")),
            ..Default::default()
        }
    }

    fn by(mut row: BookStubRow, person_id: i64, first: Option<&str>, last: &str) -> BookStubRow {
        row.person_id = Some(person_id);
        row.first_and_middle_names = first.map(str::to_string);
        row.last_name = Some(last.to_string());
        row
    }

    fn authors_json(stub: &BookStub) -> serde_json::Value {
        serde_json::to_value(stub).unwrap()["authors"].clone()
    }

    #[test]
    fn test_abbreviated_author() {
        let mut row = by(stub_row(1), 1, Some("John"), "Smith");
        row.titles = Some("Dr.".into());
        row.credentials = Some("PhD".into());

        let short: BookStub = aggregate_one(&[row.clone()], &NamingPolicy { full_text: false })
            .unwrap()
            .unwrap();
        assert_eq!(authors_json(&short), "J. Smith");

        let full: BookStub = aggregate_one(&[row], &NamingPolicy { full_text: true })
            .unwrap()
            .unwrap();
        assert_eq!(authors_json(&full), "Dr. John Smith, PhD");
    }

    #[test]
    fn test_author_list_joins_each_author_once() {
        // Genres multiply the rows; every author must still appear once.
        let mut rows = Vec::new();
        for genre_id in [1, 2] {
            for (id, first, last) in [(1, "Ann", "Ash"), (2, "Bob", "Birch"), (3, "Cy", "Cedar")] {
                let mut row = by(stub_row(1), id, Some(first), last);
                row.genre_id = Some(genre_id);
                row.genre_name = Some("G".into());
                row.genre_short_name = Some("g".into());
                rows.push(row);
            }
        }
        let stub: BookStub = aggregate_one(&rows, &NamingPolicy::default()).unwrap().unwrap();
        assert_eq!(authors_json(&stub), "A. Ash, B. Birch, and C. Cedar");
        assert_eq!(stub.genres.len(), 2);
    }

    #[test]
    fn test_two_authors_and_organization() {
        let rows = vec![
            by(stub_row(1), 1, Some("Ann"), "Ash"),
            by(stub_row(1), 2, None, "Acme Press"),
        ];
        let stub: BookStub = aggregate_one(&rows, &NamingPolicy::default()).unwrap().unwrap();
        assert_eq!(authors_json(&stub), "A. Ash and Acme Press");
    }

    #[test]
    fn test_no_authors_is_empty_string() {
        let stub: BookStub = aggregate_one(&[stub_row(1)], &NamingPolicy::default())
            .unwrap()
            .unwrap();
        assert_eq!(authors_json(&stub), "");
        assert_eq!(stub.price, 0.0);
    }

    #[test]
    fn test_price_and_series_from_rows() {
        let mut first = stub_row(1);
        first.price = Some(12.5);
        first.series_id = Some(3);
        first.series_title = Some("Saga".into());
        first.series_volume = Some(2);
        let mut second = first.clone();
        second.price = Some(99.0);

        let stub: BookStub = aggregate_one(&[first, second], &NamingPolicy::default())
            .unwrap()
            .unwrap();
        assert_eq!(stub.price, 12.5);
        let json = serde_json::to_value(&stub).unwrap();
        assert_eq!(json["series"], serde_json::json!([{"seriesId": 3, "title": "Saga", "volume": 2}]));
    }

    #[test]
    fn test_paged_stubs() {
        let rows: Vec<BookStubRow> = (1..=10)
            .flat_map(|id| vec![by(stub_row(id), 1, Some("A"), "Ash"), by(stub_row(id), 2, Some("B"), "Birch")])
            .collect();
        let page: Vec<BookStub> =
            aggregate_page(&rows, &NamingPolicy::default(), Page::new(3, 2)).unwrap();
        let ids: Vec<i64> = page.iter().map(|s| s.book_id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert_eq!(page[0].authors.len(), 2);

        let all: Vec<BookStub> = aggregate(&rows, &NamingPolicy::default()).unwrap();
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn test_fulltext_flag_values() {
        assert!(!NamingPolicy::from_flag(None).full_text);
        for off in ["", "0", "false", "no", "FALSE"] {
            assert!(!NamingPolicy::from_flag(Some(off)).full_text, "{off}");
        }
        for on in ["1", "true", "yes"] {
            assert!(NamingPolicy::from_flag(Some(on)).full_text, "{on}");
        }
    }
}
