//! Genres and their tags
//!
//! Genre is the one two-level shape shared by several views: books, book
//! stubs and the genre listing all fold a `(genre, tag)` column pair into a
//! keyed genre collection, and the genre folds the tag into its own
//! collection.

use serde::Serialize;

use super::aggregate::{Aggregate, Keyed, MalformedRow, required, required_str};
use crate::db::GenreRow;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_id: i64,
    pub genre_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub genre_id: i64,
    pub name: String,
    pub short_name: String,
    pub tags: Keyed<i64, Tag>,
}

/// Borrowed view over the genre and tag columns of a joined row.
pub struct GenreColumns<'a> {
    pub genre_id: Option<i64>,
    pub name: &'a Option<String>,
    pub short_name: &'a Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: &'a Option<String>,
}

impl Genre {
    pub fn from_columns(cols: &GenreColumns<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            genre_id: required(&cols.genre_id, "genre_id")?,
            name: required_str(cols.name, "genre_name")?,
            short_name: required_str(cols.short_name, "genre_short_name")?,
            tags: Keyed::new(),
        })
    }

    /// Add a tag under this genre unless it is absent or already present.
    pub fn add_tag(&mut self, tag_id: Option<i64>, name: &Option<String>) -> Result<(), MalformedRow> {
        let genre_id = self.genre_id;
        self.tags.insert_new(tag_id, || {
            Ok(Tag {
                tag_id: required(&tag_id, "tag_id")?,
                genre_id,
                name: required_str(name, "tag_name")?,
            })
        })
    }
}

impl GenreColumns<'_> {
    /// Fold this row's genre, then its tag, into `genres`.
    pub fn fold_into(&self, genres: &mut Keyed<i64, Genre>) -> Result<(), MalformedRow> {
        match genres.upsert(self.genre_id, || Genre::from_columns(self))? {
            Some(genre) => genre.add_tag(self.tag_id, self.tag_name),
            None => Ok(()),
        }
    }
}

impl GenreRow {
    fn columns(&self) -> GenreColumns<'_> {
        GenreColumns {
            genre_id: self.genre_id,
            name: &self.name,
            short_name: &self.short_name,
            tag_id: self.tag_id,
            tag_name: &self.tag_name,
        }
    }
}

impl Aggregate for Genre {
    type Key = i64;
    type Row = GenreRow;
    type Context = ();

    fn root_key(row: &GenreRow) -> Result<i64, MalformedRow> {
        required(&row.genre_id, "genre_id")
    }

    fn new(row: &GenreRow, _: &()) -> Result<Self, MalformedRow> {
        Genre::from_columns(&row.columns())
    }

    fn fold(&mut self, row: &GenreRow, _: &()) -> Result<(), MalformedRow> {
        self.add_tag(row.tag_id, &row.tag_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aggregate::aggregate;
    use pretty_assertions::assert_eq;

    fn row(genre_id: i64, tag: Option<(i64, &str)>) -> GenreRow {
        GenreRow {
            genre_id: Some(genre_id),
            name: Some(format!("Genre {genre_id}")),
            short_name: Some(format!("G{genre_id}")),
            tag_id: tag.map(|(id, _)| id),
            tag_name: tag.map(|(_, name)| name.to_string()),
        }
    }

    fn tag_ids(genre: &Genre) -> Vec<i64> {
        genre.tags.keys().copied().collect()
    }

    #[test]
    fn test_distinct_tags_nest_under_one_genre() {
        let rows = vec![row(1, Some((10, "a"))), row(1, Some((11, "b")))];
        let genres: Vec<Genre> = aggregate(&rows, &()).unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(tag_ids(&genres[0]), vec![10, 11]);
    }

    #[test]
    fn test_repeated_tag_is_kept_once() {
        let rows = vec![row(1, Some((10, "a"))), row(1, Some((10, "a")))];
        let genres: Vec<Genre> = aggregate(&rows, &()).unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(tag_ids(&genres[0]), vec![10]);
    }

    #[test]
    fn test_genre_without_tags() {
        let rows = vec![row(2, None), row(3, Some((30, "x")))];
        let genres: Vec<Genre> = aggregate(&rows, &()).unwrap();
        assert!(genres[0].tags.is_empty());
        assert_eq!(tag_ids(&genres[1]), vec![30]);
    }

    #[test]
    fn test_fold_into_skips_absent_genre() {
        let name = Some("orphan".to_string());
        let none = None;
        let cols = GenreColumns {
            genre_id: None,
            name: &none,
            short_name: &none,
            tag_id: Some(5),
            tag_name: &name,
        };
        let mut genres = Keyed::new();
        cols.fold_into(&mut genres).unwrap();
        assert!(genres.is_empty());
    }

    #[test]
    fn test_genre_json_shape() {
        let rows = vec![row(1, Some((10, "Epic")))];
        let genres: Vec<Genre> = aggregate(&rows, &()).unwrap();
        let json = serde_json::to_string(&genres[0]).unwrap();
        assert_eq!(
            json,
            r#"{"genreId":1,"name":"Genre 1","shortName":"G1","tags":[{"tagId":10,"genreId":1,"name":"Epic"}]}"#
        );
    }
}
