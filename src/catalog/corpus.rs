//! Author corpora
//!
//! One corpus per author: the author's books, each with its genres and tags
//! and the names of the other authors of that book. Co-authors are filled in
//! after aggregation, since a book's other authors live in other corpora.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use super::aggregate::{Aggregate, Keyed, MalformedRow, aggregate_keyed, required, required_str};
use super::names;
use crate::db::{CoauthorRow, CorpusRow};

/// Corpus build options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusContext {
    /// Placeholder tag for untagged genre assignments, left out of the view.
    pub untagged_tag_id: i64,
}

impl Default for CorpusContext {
    fn default() -> Self {
        Self { untagged_tag_id: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusBookTag {
    pub tag_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusBookGenre {
    pub genre_id: i64,
    pub name: String,
    pub tags: Keyed<i64, CorpusBookTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusBookStub {
    pub book_id: i64,
    pub title: String,
    pub sortable_title: String,
    pub other_authors: Keyed<i64, String>,
    pub genres: Keyed<i64, CorpusBookGenre>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    pub person_id: i64,
    pub name: String,
    pub sortable_name: Option<String>,
    pub book_stubs: Keyed<i64, CorpusBookStub>,
}

impl CorpusBookGenre {
    fn fold(&mut self, row: &CorpusRow, ctx: &CorpusContext) -> Result<(), MalformedRow> {
        if row.tag_id == Some(ctx.untagged_tag_id) {
            return Ok(());
        }
        self.tags.insert_new(row.tag_id, || {
            Ok(CorpusBookTag {
                tag_id: required(&row.tag_id, "tag_id")?,
                name: required_str(&row.tag_name, "tag_name")?,
            })
        })
    }
}

impl CorpusBookStub {
    fn fold(&mut self, row: &CorpusRow, ctx: &CorpusContext) -> Result<(), MalformedRow> {
        let genre = self.genres.upsert(row.genre_id, || {
            Ok(CorpusBookGenre {
                genre_id: required(&row.genre_id, "genre_id")?,
                name: required_str(&row.genre_name, "genre_name")?,
                tags: Keyed::new(),
            })
        })?;
        match genre {
            Some(genre) => genre.fold(row, ctx),
            None => Ok(()),
        }
    }
}

impl Corpus {
    /// Record `author_name` as a co-author of `book_id` in this corpus.
    ///
    /// The corpus' own author, unknown books and repeated co-authors are
    /// ignored.
    pub fn add_coauthor(&mut self, book_id: i64, author_id: i64, author_name: &str) {
        if author_id == self.person_id {
            return;
        }
        if let Some(stub) = self.book_stubs.get_mut(&book_id) {
            stub.other_authors
                .insert_if_absent(author_id, || author_name.to_string());
        }
    }

    /// Fill co-authors of a single corpus from a listing of every author of
    /// its books.
    pub fn add_coauthors(&mut self, rows: &[CoauthorRow]) -> Result<(), MalformedRow> {
        for row in rows {
            let book_id = required(&row.book_id, "book_id")?;
            let person_id = required(&row.person_id, "person_id")?;
            let name = names::display_name(
                row.titles.as_deref(),
                row.first_and_middle_names.as_deref(),
                &required_str(&row.last_name, "last_name")?,
                row.credentials.as_deref(),
            );
            self.add_coauthor(book_id, person_id, &name);
        }
        Ok(())
    }
}

impl Aggregate for Corpus {
    type Key = i64;
    type Row = CorpusRow;
    type Context = CorpusContext;

    fn root_key(row: &CorpusRow) -> Result<i64, MalformedRow> {
        required(&row.person_id, "person_id")
    }

    fn new(row: &CorpusRow, _: &CorpusContext) -> Result<Self, MalformedRow> {
        Ok(Self {
            person_id: required(&row.person_id, "person_id")?,
            name: names::display_name(
                row.titles.as_deref(),
                row.first_and_middle_names.as_deref(),
                &required_str(&row.last_name, "last_name")?,
                row.credentials.as_deref(),
            ),
            sortable_name: row.sortable_name.clone(),
            book_stubs: Keyed::new(),
        })
    }

    fn fold(&mut self, row: &CorpusRow, ctx: &CorpusContext) -> Result<(), MalformedRow> {
        let stub = self.book_stubs.upsert(row.book_id, || {
            Ok(CorpusBookStub {
                book_id: required(&row.book_id, "book_id")?,
                title: required_str(&row.full_title, "full_title")?,
                sortable_title: required_str(&row.sortable_title, "sortable_title")?,
                other_authors: Keyed::new(),
                genres: Keyed::new(),
            })
        })?;
        match stub {
            Some(stub) => stub.fold(row, ctx),
            None => Ok(()),
        }
    }
}

/// Aggregate every corpus, then cross-link the authors of shared books.
pub fn aggregate_corpora(
    rows: &[CorpusRow],
    ctx: &CorpusContext,
) -> Result<Vec<Corpus>, MalformedRow> {
    let mut corpora = aggregate_keyed::<Corpus>(rows, ctx)?;

    let mut authors_by_book: IndexMap<i64, Vec<i64>> = IndexMap::new();
    for corpus in corpora.values() {
        for book_id in corpus.book_stubs.keys() {
            authors_by_book
                .entry(*book_id)
                .or_default()
                .push(corpus.person_id);
        }
    }

    let names: HashMap<i64, String> = corpora
        .values()
        .map(|c| (c.person_id, c.name.clone()))
        .collect();

    for (book_id, authors) in &authors_by_book {
        for author in authors {
            let Some(corpus) = corpora.get_mut(author) else {
                continue;
            };
            for coauthor in authors {
                if let Some(name) = names.get(coauthor) {
                    corpus.add_coauthor(*book_id, *coauthor, name);
                }
            }
        }
    }

    Ok(corpora.into_values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aggregate::aggregate_one;
    use pretty_assertions::assert_eq;

    fn corpus_row(person_id: i64, last: &str, book_id: i64, genre_id: i64, tag_id: i64) -> CorpusRow {
        CorpusRow {
            person_id: Some(person_id),
            last_name: Some(last.to_string()),
            first_and_middle_names: Some("Pat".to_string()),
            sortable_name: Some(format!("{last}, Pat")),
            book_id: Some(book_id),
            full_title: Some(format!("Book {book_id}")),
            sortable_title: Some(format!("Book {book_id}")),
            genre_id: Some(genre_id),
            genre_name: Some(format!("Genre {genre_id}")),
            tag_id: Some(tag_id),
            tag_name: Some(format!("Tag {tag_id}")),
            ..Default::default()
        }
    }

    fn other_authors(corpus: &Corpus, book_id: i64) -> Vec<String> {
        corpus
            .book_stubs
            .get(&book_id)
            .unwrap()
            .other_authors
            .values()
            .cloned()
            .collect()
    }

    #[test]
    fn test_coauthors_are_symmetric() {
        // Book 1 by A, B and C with two genres each, so each pair of authors
        // shares the book across several rows.
        let mut rows = Vec::new();
        for (id, last) in [(1, "Ash"), (2, "Birch"), (3, "Cedar")] {
            rows.push(corpus_row(id, last, 1, 1, 5));
            rows.push(corpus_row(id, last, 1, 2, 6));
        }
        let corpora = aggregate_corpora(&rows, &CorpusContext::default()).unwrap();
        assert_eq!(corpora.len(), 3);

        assert_eq!(other_authors(&corpora[0], 1), vec!["Pat Birch", "Pat Cedar"]);
        assert_eq!(other_authors(&corpora[1], 1), vec!["Pat Ash", "Pat Cedar"]);
        assert_eq!(other_authors(&corpora[2], 1), vec!["Pat Ash", "Pat Birch"]);
    }

    #[test]
    fn test_sole_author_has_no_coauthors() {
        let rows = vec![corpus_row(1, "Ash", 1, 1, 5), corpus_row(1, "Ash", 2, 1, 5)];
        let corpora = aggregate_corpora(&rows, &CorpusContext::default()).unwrap();
        assert!(other_authors(&corpora[0], 1).is_empty());
        assert!(other_authors(&corpora[0], 2).is_empty());
    }

    #[test]
    fn test_untagged_sentinel_is_excluded() {
        let rows = vec![corpus_row(1, "Ash", 1, 1, 1), corpus_row(1, "Ash", 1, 1, 9)];
        let corpus: Corpus = aggregate_one(&rows, &CorpusContext::default()).unwrap().unwrap();
        let genre = corpus.book_stubs.get(&1).unwrap().genres.get(&1).unwrap();
        assert_eq!(genre.tags.keys().copied().collect::<Vec<_>>(), vec![9]);

        let custom = CorpusContext { untagged_tag_id: 9 };
        let corpus: Corpus = aggregate_one(&rows, &custom).unwrap().unwrap();
        let genre = corpus.book_stubs.get(&1).unwrap().genres.get(&1).unwrap();
        assert_eq!(genre.tags.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_single_corpus_coauthor_listing() {
        let rows = vec![corpus_row(1, "Ash", 1, 1, 5)];
        let mut corpus: Corpus = aggregate_one(&rows, &CorpusContext::default()).unwrap().unwrap();
        let listing = vec![
            CoauthorRow {
                book_id: Some(1),
                person_id: Some(1),
                last_name: Some("Ash".into()),
                ..Default::default()
            },
            CoauthorRow {
                book_id: Some(1),
                person_id: Some(2),
                last_name: Some("Birch".into()),
                first_and_middle_names: Some("Bo".into()),
                titles: Some("Dr.".into()),
                ..Default::default()
            },
            CoauthorRow {
                book_id: Some(7),
                person_id: Some(3),
                last_name: Some("Cedar".into()),
                ..Default::default()
            },
        ];
        corpus.add_coauthors(&listing).unwrap();
        assert_eq!(other_authors(&corpus, 1), vec!["Dr. Bo Birch"]);
    }

    #[test]
    fn test_corpus_json_shape() {
        let rows = vec![corpus_row(1, "Ash", 1, 1, 5)];
        let corpus: Corpus = aggregate_one(&rows, &CorpusContext::default()).unwrap().unwrap();
        let json = serde_json::to_value(&corpus).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "personId": 1,
                "name": "Pat Ash",
                "sortableName": "Ash, Pat",
                "bookStubs": [{
                    "bookId": 1,
                    "title": "Book 1",
                    "sortableTitle": "Book 1",
                    "otherAuthors": [],
                    "genres": [{"genreId": 1, "name": "Genre 1", "tags": [{"tagId": 5, "name": "Tag 5"}]}]
                }]
            })
        );
    }
}
