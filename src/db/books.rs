//! Books repository
//!
//! Book reads return one row per book x version x contributor x genre x
//! series combination, shaped as [`BookRow`] and folded by the catalog
//! builders. The series repository reuses the same row shape.

use serde::Deserialize;
use sqlx::SqlitePool;

use super::versions::{self, CreateVersion, VersionInput};
use super::{check_path_id, required_text};
use crate::catalog::names::{self, blank_to_none};
use crate::catalog::{Book, Page, aggregate_one, aggregate_page};
use crate::error::ApiResult;

// ============================================================================
// Row shape
// ============================================================================

/// Flat row of the book queries. Every column may be NULL on a LEFT JOIN.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct BookRow {
    pub book_id: Option<i64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub full_title: Option<String>,
    pub sortable_title: Option<String>,
    pub alternate_title: Option<String>,
    pub comments: Option<String>,

    pub version_id: Option<i64>,
    pub version_edition: Option<i64>,
    pub version_year: Option<i64>,
    pub version_publisher: Option<String>,
    pub version_location: Option<String>,
    pub version_isbn10: Option<String>,
    pub version_isbn13: Option<String>,
    pub version_price: Option<f64>,
    pub version_quantity: Option<i64>,
    pub version_url: Option<String>,
    pub version_is_hardcover: Option<bool>,
    pub version_is_paperback: Option<bool>,
    pub version_is_mm_paperback: Option<bool>,
    pub version_is_leatherbound: Option<bool>,
    pub version_is_ebook: Option<bool>,
    pub version_is_textbook: Option<bool>,
    pub version_is_hand_bound: Option<bool>,
    pub version_details_mixed: Option<bool>,
    pub version_notes: Option<String>,

    pub author_id: Option<i64>,
    pub author_last_name: Option<String>,
    pub author_first_and_middle_names: Option<String>,
    pub author_titles: Option<String>,
    pub author_credentials: Option<String>,
    pub author_is_organization: Option<bool>,
    pub author_sortable_name: Option<String>,
    pub author_notes: Option<String>,

    pub editor_id: Option<i64>,
    pub editor_last_name: Option<String>,
    pub editor_first_and_middle_names: Option<String>,
    pub editor_titles: Option<String>,
    pub editor_credentials: Option<String>,
    pub editor_is_organization: Option<bool>,
    pub editor_sortable_name: Option<String>,
    pub editor_notes: Option<String>,

    pub translator_id: Option<i64>,
    pub translator_last_name: Option<String>,
    pub translator_first_and_middle_names: Option<String>,
    pub translator_titles: Option<String>,
    pub translator_credentials: Option<String>,
    pub translator_is_organization: Option<bool>,
    pub translator_sortable_name: Option<String>,
    pub translator_notes: Option<String>,

    pub genre_id: Option<i64>,
    pub genre_name: Option<String>,
    pub genre_short_name: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,

    pub series_id: Option<i64>,
    pub series_title: Option<String>,
    pub series_subtitle: Option<String>,
    pub series_price: Option<f64>,
    pub series_isbn13: Option<String>,
    pub series_isbn10: Option<String>,
    pub series_amazon_url: Option<String>,
    pub volume: Option<i64>,
}

const BOOK_COLUMNS: &str = r#"
    b.book_id, b.title, b.subtitle, b.full_title, b.sortable_title,
    b.alternate_title, b.comments,
    v.version_id, v.edition AS version_edition, v.year AS version_year,
    v.publisher AS version_publisher, v.location AS version_location,
    v.isbn10 AS version_isbn10, v.isbn13 AS version_isbn13,
    v.price AS version_price, v.quantity AS version_quantity, v.url AS version_url,
    v.is_hardcover AS version_is_hardcover, v.is_paperback AS version_is_paperback,
    v.is_mm_paperback AS version_is_mm_paperback,
    v.is_leatherbound AS version_is_leatherbound, v.is_ebook AS version_is_ebook,
    v.is_textbook AS version_is_textbook, v.is_hand_bound AS version_is_hand_bound,
    v.details_mixed AS version_details_mixed, v.notes AS version_notes,
    a.person_id AS author_id, a.last_name AS author_last_name,
    a.first_and_middle_names AS author_first_and_middle_names,
    a.titles AS author_titles, a.credentials AS author_credentials,
    a.is_organization AS author_is_organization,
    a.sortable_name AS author_sortable_name, a.notes AS author_notes,
    e.person_id AS editor_id, e.last_name AS editor_last_name,
    e.first_and_middle_names AS editor_first_and_middle_names,
    e.titles AS editor_titles, e.credentials AS editor_credentials,
    e.is_organization AS editor_is_organization,
    e.sortable_name AS editor_sortable_name, e.notes AS editor_notes,
    tr.person_id AS translator_id, tr.last_name AS translator_last_name,
    tr.first_and_middle_names AS translator_first_and_middle_names,
    tr.titles AS translator_titles, tr.credentials AS translator_credentials,
    tr.is_organization AS translator_is_organization,
    tr.sortable_name AS translator_sortable_name, tr.notes AS translator_notes,
    g.genre_id, g.name AS genre_name, g.short_name AS genre_short_name,
    t.tag_id, t.name AS tag_name,
    s.series_id, s.title AS series_title, s.subtitle AS series_subtitle,
    s.price AS series_price, s.isbn13 AS series_isbn13, s.isbn10 AS series_isbn10,
    s.amazon_url AS series_amazon_url, bs.volume
"#;

/// Joins hanging off `books AS b`.
const BOOK_DETAIL_JOINS: &str = r#"
    LEFT JOIN versions AS v ON b.book_id = v.book_id
    LEFT JOIN book_authors AS ba ON b.book_id = ba.book_id
    LEFT JOIN persons AS a ON ba.person_id = a.person_id
    LEFT JOIN book_editors AS be ON b.book_id = be.book_id
    LEFT JOIN persons AS e ON be.person_id = e.person_id
    LEFT JOIN book_translators AS bt ON b.book_id = bt.book_id
    LEFT JOIN persons AS tr ON bt.person_id = tr.person_id
    LEFT JOIN book_genres AS bg ON b.book_id = bg.book_id
    LEFT JOIN genres AS g ON bg.genre_id = g.genre_id
    LEFT JOIN tags AS t ON bg.tag_id = t.tag_id
"#;

const CONTRIBUTOR_ORDER: &str = "ba.person_order, be.person_order, bt.person_order, v.version_id";

/// Book-rooted query: `filter` is a WHERE clause (or empty), `order` leads the
/// ORDER BY ahead of the contributor ordering.
fn book_query(filter: &str, order: &str) -> String {
    format!(
        "SELECT {BOOK_COLUMNS} FROM books AS b {BOOK_DETAIL_JOINS} \
         LEFT JOIN book_series AS bs ON b.book_id = bs.book_id \
         LEFT JOIN series AS s ON bs.series_id = s.series_id \
         {filter} ORDER BY {order}{CONTRIBUTOR_ORDER}"
    )
}

/// Series-rooted query over the same row shape.
pub(super) fn series_query(filter: &str, order: &str) -> String {
    format!(
        "SELECT {BOOK_COLUMNS} FROM series AS s \
         LEFT JOIN book_series AS bs ON s.series_id = bs.series_id \
         LEFT JOIN books AS b ON bs.book_id = b.book_id \
         {BOOK_DETAIL_JOINS} \
         {filter} ORDER BY {order}{CONTRIBUTOR_ORDER}"
    )
}

// ============================================================================
// Write inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInBook {
    pub genre_id: i64,
    pub tag_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInBook {
    pub series_id: i64,
    pub volume: Option<i64>,
}

/// Book request body as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub book_id: Option<i64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub alternate_title: Option<String>,
    pub comments: Option<String>,
    pub authors: Option<Vec<i64>>,
    pub editors: Option<Vec<i64>>,
    pub translators: Option<Vec<i64>>,
    pub genres: Option<Vec<GenreInBook>>,
    pub series: Option<Vec<SeriesInBook>>,
    pub versions: Option<Vec<VersionInput>>,
}

/// Validated book fields. `None` lists are left untouched on update.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBook {
    pub title: String,
    pub subtitle: Option<String>,
    pub alternate_title: Option<String>,
    pub comments: Option<String>,
    pub authors: Option<Vec<i64>>,
    pub editors: Option<Vec<i64>>,
    pub translators: Option<Vec<i64>>,
    pub genres: Option<Vec<GenreInBook>>,
    pub series: Option<Vec<SeriesInBook>>,
    pub versions: Option<Vec<CreateVersion>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBook {
    pub book_id: i64,
    pub book: CreateBook,
}

impl CreateBook {
    pub fn full_title(&self) -> String {
        names::full_title(&self.title, self.subtitle.as_deref())
    }
}

impl TryFrom<BookInput> for CreateBook {
    type Error = crate::error::ApiError;

    fn try_from(input: BookInput) -> ApiResult<Self> {
        Ok(Self {
            title: required_text(input.title, "title")?,
            subtitle: input.subtitle,
            alternate_title: blank_to_none(input.alternate_title),
            comments: blank_to_none(input.comments),
            authors: input.authors,
            editors: input.editors,
            translators: input.translators,
            genres: input.genres,
            series: input.series,
            versions: input
                .versions
                .map(|versions| versions.into_iter().map(CreateVersion::from).collect()),
        })
    }
}

impl UpdateBook {
    pub fn from_input(input: BookInput, path_id: i64) -> ApiResult<Self> {
        let book_id = check_path_id(input.book_id, path_id, "bookId")?;
        Ok(Self {
            book_id,
            book: CreateBook::try_from(input)?,
        })
    }
}

// ============================================================================
// Repository
// ============================================================================

pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List books by sortable title, paged over whole books.
    pub async fn list(&self, page: Page) -> ApiResult<Vec<Book>> {
        let mut conn = self.pool.acquire().await?;
        let sql = book_query("", "b.sortable_title, b.book_id, ");
        let rows: Vec<BookRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(aggregate_page(&rows, &(), page)?)
    }

    pub async fn get(&self, book_id: i64) -> ApiResult<Option<Book>> {
        let mut conn = self.pool.acquire().await?;
        let sql = book_query("WHERE b.book_id = ?", "");
        let rows: Vec<BookRow> = sqlx::query_as(&sql)
            .bind(book_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(aggregate_one(&rows, &())?)
    }

    /// Insert a book and its links. Statements run one after another without
    /// a transaction; a failure part-way leaves the earlier rows in place.
    pub async fn create(&self, book: &CreateBook) -> ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let full_title = book.full_title();

        let book_id = sqlx::query(
            r#"
            INSERT INTO books (title, subtitle, alternate_title, comments, full_title, sortable_title)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.alternate_title)
        .bind(&book.comments)
        .bind(&full_title)
        .bind(names::sortable_title(&full_title))
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        write_links(&mut conn, book_id, book, false).await?;

        tracing::info!(book_id, title = %book.title, "Created book");
        Ok(book_id)
    }

    /// Update a book, replacing every link list present in the input.
    /// Returns `false` when the book does not exist.
    pub async fn update(&self, update: &UpdateBook) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let book = &update.book;
        let full_title = book.full_title();

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = ?, subtitle = ?, alternate_title = ?, comments = ?,
                full_title = ?, sortable_title = ?
            WHERE book_id = ?
            "#,
        )
        .bind(&book.title)
        .bind(&book.subtitle)
        .bind(&book.alternate_title)
        .bind(&book.comments)
        .bind(&full_title)
        .bind(names::sortable_title(&full_title))
        .bind(update.book_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        write_links(&mut conn, update.book_id, book, true).await?;

        tracing::info!(book_id = update.book_id, "Updated book");
        Ok(true)
    }

    /// Delete a book; link rows and versions cascade.
    pub async fn delete(&self, book_id: i64) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM books WHERE book_id = ?")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Contributor link tables, in the order they are written.
const CONTRIBUTOR_TABLES: [&str; 3] = ["book_authors", "book_editors", "book_translators"];

/// Write the link lists of `book`. With `replace`, each present list first
/// deletes the stored one.
async fn write_links(
    conn: &mut sqlx::SqliteConnection,
    book_id: i64,
    book: &CreateBook,
    replace: bool,
) -> ApiResult<()> {
    let contributors = [&book.authors, &book.editors, &book.translators];
    for (table, persons) in CONTRIBUTOR_TABLES.iter().zip(contributors) {
        let Some(persons) = persons else { continue };
        if replace {
            sqlx::query(&format!("DELETE FROM {table} WHERE book_id = ?"))
                .bind(book_id)
                .execute(&mut *conn)
                .await?;
        }
        let insert = format!("INSERT INTO {table} (book_id, person_id, person_order) VALUES (?, ?, ?)");
        for (order, person_id) in persons.iter().enumerate() {
            sqlx::query(&insert)
                .bind(book_id)
                .bind(*person_id)
                .bind(order as i64)
                .execute(&mut *conn)
                .await?;
        }
    }

    if let Some(genres) = &book.genres {
        if replace {
            sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
                .bind(book_id)
                .execute(&mut *conn)
                .await?;
        }
        for genre in genres {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id, tag_id) VALUES (?, ?, ?)")
                .bind(book_id)
                .bind(genre.genre_id)
                .bind(genre.tag_id)
                .execute(&mut *conn)
                .await?;
        }
    }

    if let Some(series) = &book.series {
        if replace {
            sqlx::query("DELETE FROM book_series WHERE book_id = ?")
                .bind(book_id)
                .execute(&mut *conn)
                .await?;
        }
        for entry in series {
            sqlx::query("INSERT INTO book_series (book_id, series_id, volume) VALUES (?, ?, ?)")
                .bind(book_id)
                .bind(entry.series_id)
                .bind(entry.volume)
                .execute(&mut *conn)
                .await?;
        }
    }

    if let Some(book_versions) = &book.versions {
        if replace {
            versions::delete_for_book(&mut *conn, book_id).await?;
        }
        for version in book_versions {
            versions::insert(&mut *conn, book_id, version).await?;
        }
    }

    Ok(())
}
