//! Books
//!
//! [`BookWithoutSeries`] is the book shape nested inside a series; [`Book`]
//! adds the series memberships on top of it for the top-level views. Both
//! read the same [`BookRow`] shape.

use serde::Serialize;

use super::aggregate::{Aggregate, Keyed, MalformedRow, required, required_str};
use super::genre::{Genre, GenreColumns};
use super::person::{Person, PersonColumns};
use super::series::SeriesWithoutBooks;
use super::version::Version;
use crate::db::BookRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookWithoutSeries {
    pub book_id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub alternate_title: Option<String>,
    pub comments: Option<String>,
    pub authors: Keyed<i64, Person>,
    pub editors: Keyed<i64, Person>,
    pub translators: Keyed<i64, Person>,
    pub full_title: String,
    pub sortable_title: String,
    pub genres: Keyed<i64, Genre>,
    /// Position within a series; only set when nested in one.
    pub volume: Option<i64>,
    pub versions: Keyed<i64, Version>,
}

impl BookWithoutSeries {
    pub fn new(row: &BookRow, volume: Option<i64>) -> Result<Self, MalformedRow> {
        Ok(Self {
            book_id: required(&row.book_id, "book_id")?,
            title: required_str(&row.title, "title")?,
            subtitle: row.subtitle.clone(),
            alternate_title: row.alternate_title.clone(),
            comments: row.comments.clone(),
            authors: Keyed::new(),
            editors: Keyed::new(),
            translators: Keyed::new(),
            full_title: required_str(&row.full_title, "full_title")?,
            sortable_title: required_str(&row.sortable_title, "sortable_title")?,
            genres: Keyed::new(),
            volume,
            versions: Keyed::new(),
        })
    }

    pub fn fold(&mut self, row: &BookRow) -> Result<(), MalformedRow> {
        let author = row.author();
        self.authors
            .insert_new(author.person_id, || Person::from_columns(&author))?;

        let editor = row.editor();
        self.editors
            .insert_new(editor.person_id, || Person::from_columns(&editor))?;

        let translator = row.translator();
        self.translators
            .insert_new(translator.person_id, || Person::from_columns(&translator))?;

        row.genre().fold_into(&mut self.genres)?;

        self.versions
            .insert_new(row.version_id, || Version::from_book_row(row))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    #[serde(flatten)]
    pub book: BookWithoutSeries,
    pub series: Keyed<i64, SeriesWithoutBooks>,
}

impl Aggregate for Book {
    type Key = i64;
    type Row = BookRow;
    type Context = ();

    fn root_key(row: &BookRow) -> Result<i64, MalformedRow> {
        required(&row.book_id, "book_id")
    }

    fn new(row: &BookRow, _: &()) -> Result<Self, MalformedRow> {
        Ok(Self {
            book: BookWithoutSeries::new(row, None)?,
            series: Keyed::new(),
        })
    }

    fn fold(&mut self, row: &BookRow, _: &()) -> Result<(), MalformedRow> {
        self.book.fold(row)?;
        self.series
            .insert_new(row.series_id, || SeriesWithoutBooks::from_book_row(row))
    }
}

impl BookRow {
    pub(crate) fn author(&self) -> PersonColumns<'_> {
        PersonColumns {
            person_id: self.author_id,
            last_name: &self.author_last_name,
            first_and_middle_names: &self.author_first_and_middle_names,
            titles: &self.author_titles,
            credentials: &self.author_credentials,
            is_organization: self.author_is_organization,
            sortable_name: &self.author_sortable_name,
            notes: &self.author_notes,
        }
    }

    pub(crate) fn editor(&self) -> PersonColumns<'_> {
        PersonColumns {
            person_id: self.editor_id,
            last_name: &self.editor_last_name,
            first_and_middle_names: &self.editor_first_and_middle_names,
            titles: &self.editor_titles,
            credentials: &self.editor_credentials,
            is_organization: self.editor_is_organization,
            sortable_name: &self.editor_sortable_name,
            notes: &self.editor_notes,
        }
    }

    pub(crate) fn translator(&self) -> PersonColumns<'_> {
        PersonColumns {
            person_id: self.translator_id,
            last_name: &self.translator_last_name,
            first_and_middle_names: &self.translator_first_and_middle_names,
            titles: &self.translator_titles,
            credentials: &self.translator_credentials,
            is_organization: self.translator_is_organization,
            sortable_name: &self.translator_sortable_name,
            notes: &self.translator_notes,
        }
    }

    pub(crate) fn genre(&self) -> GenreColumns<'_> {
        GenreColumns {
            genre_id: self.genre_id,
            name: &self.genre_name,
            short_name: &self.genre_short_name,
            tag_id: self.tag_id,
            tag_name: &self.tag_name,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::aggregate::{aggregate, aggregate_one};
    use pretty_assertions::assert_eq;

    pub(crate) fn book_row(book_id: i64, title: &str) -> BookRow {
        BookRow {
            book_id: Some(book_id),
            title: Some(title.to_string()),
            full_title: Some(title.to_string()),
            sortable_title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn with_author(mut row: BookRow, id: i64, first: &str, last: &str) -> BookRow {
        row.author_id = Some(id);
        row.author_first_and_middle_names = Some(first.to_string());
        row.author_last_name = Some(last.to_string());
        row
    }

    pub(crate) fn with_genre(mut row: BookRow, genre_id: i64, tag_id: Option<i64>) -> BookRow {
        row.genre_id = Some(genre_id);
        row.genre_name = Some(format!("Genre {genre_id}"));
        row.genre_short_name = Some(format!("G{genre_id}"));
        row.tag_id = tag_id;
        row.tag_name = tag_id.map(|id| format!("Tag {id}"));
        row
    }

    fn author_ids(book: &Book) -> Vec<i64> {
        book.book.authors.keys().copied().collect()
    }

    #[test]
    fn test_contributors_are_deduplicated_across_rows() {
        // Two authors x two genres = four rows for one book.
        let base = book_row(1, "Good Omens");
        let rows = vec![
            with_genre(with_author(base.clone(), 10, "Terry", "Pratchett"), 1, Some(100)),
            with_genre(with_author(base.clone(), 10, "Terry", "Pratchett"), 2, None),
            with_genre(with_author(base.clone(), 11, "Neil", "Gaiman"), 1, Some(100)),
            with_genre(with_author(base, 11, "Neil", "Gaiman"), 2, None),
        ];
        let book: Book = aggregate_one(&rows, &()).unwrap().unwrap();
        assert_eq!(author_ids(&book), vec![10, 11]);
        assert_eq!(book.book.genres.len(), 2);
        assert_eq!(book.book.genres.get(&1).unwrap().tags.len(), 1);
        assert!(book.book.editors.is_empty());
        assert!(book.book.translators.is_empty());
    }

    #[test]
    fn test_null_editor_creates_no_placeholder() {
        let rows = vec![book_row(1, "Solo")];
        let book: Book = aggregate_one(&rows, &()).unwrap().unwrap();
        assert!(book.book.editors.is_empty());
        assert!(book.book.versions.is_empty());
        assert!(book.series.is_empty());
    }

    #[test]
    fn test_versions_and_series_keyed() {
        let mut first = book_row(1, "Dune");
        first.version_id = Some(5);
        first.series_id = Some(9);
        first.series_title = Some("Dune Chronicles".into());
        first.volume = Some(1);
        let mut second = first.clone();
        second.version_id = Some(6);

        let book: Book = aggregate_one(&[first, second], &()).unwrap().unwrap();
        assert_eq!(book.book.versions.keys().copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(book.series.len(), 1);
        assert_eq!(book.series.get(&9).unwrap().volume, Some(1));
        assert_eq!(book.book.volume, None);
    }

    #[test]
    fn test_books_keep_query_order() {
        let rows = vec![
            with_author(book_row(3, "Alpha"), 1, "A", "One"),
            with_author(book_row(3, "Alpha"), 2, "B", "Two"),
            book_row(1, "Beta"),
        ];
        let books: Vec<Book> = aggregate(&rows, &()).unwrap();
        let ids: Vec<i64> = books.iter().map(|b| b.book.book_id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_book_json_shape() {
        let rows = vec![with_author(book_row(1, "Emma"), 4, "Jane", "Austen")];
        let book: Book = aggregate_one(&rows, &()).unwrap().unwrap();
        let json = serde_json::to_value(&book).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "bookId",
                "title",
                "subtitle",
                "alternateTitle",
                "comments",
                "authors",
                "editors",
                "translators",
                "fullTitle",
                "sortableTitle",
                "genres",
                "volume",
                "versions",
                "series",
            ]
        );
        assert_eq!(json["authors"][0]["displayNameShort"], "J. Austen");

        let reparsed: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&book).unwrap()).unwrap();
        assert_eq!(reparsed, json);
    }
}
