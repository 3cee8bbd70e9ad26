//! Corpus queries: each author's works with their genres and tags

use sqlx::SqlitePool;

use crate::catalog::{Corpus, CorpusContext, aggregate_corpora, aggregate_one};
use crate::error::ApiResult;

/// One row per author x book x genre x tag.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CorpusRow {
    pub person_id: Option<i64>,
    pub last_name: Option<String>,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    pub sortable_name: Option<String>,
    pub book_id: Option<i64>,
    pub full_title: Option<String>,
    pub sortable_title: Option<String>,
    pub genre_id: Option<i64>,
    pub genre_name: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,
}

/// One row per author of a book.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CoauthorRow {
    pub book_id: Option<i64>,
    pub person_id: Option<i64>,
    pub last_name: Option<String>,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
}

const CORPUS_SELECT: &str = r#"
    SELECT p.person_id, p.last_name, p.first_and_middle_names, p.titles, p.credentials,
           p.sortable_name,
           b.book_id, b.full_title, b.sortable_title,
           g.genre_id, g.name AS genre_name,
           t.tag_id, t.name AS tag_name
    FROM persons AS p
    JOIN book_authors AS ba ON p.person_id = ba.person_id
    JOIN books AS b ON ba.book_id = b.book_id
    LEFT JOIN book_genres AS bg ON b.book_id = bg.book_id
    LEFT JOIN genres AS g ON bg.genre_id = g.genre_id
    LEFT JOIN tags AS t ON bg.tag_id = t.tag_id
"#;

pub struct CorpusRepository {
    pool: SqlitePool,
}

impl CorpusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every author with at least one book, co-authors cross-linked.
    pub async fn list(&self, ctx: &CorpusContext) -> ApiResult<Vec<Corpus>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{CORPUS_SELECT} ORDER BY p.sortable_name, p.person_id, b.sortable_title, b.book_id");
        let rows: Vec<CorpusRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(aggregate_corpora(&rows, ctx)?)
    }

    /// A single author's corpus. Co-authors come from a second query over
    /// every author of the person's books.
    pub async fn get(&self, person_id: i64, ctx: &CorpusContext) -> ApiResult<Option<Corpus>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{CORPUS_SELECT} WHERE p.person_id = ? ORDER BY b.sortable_title, b.book_id");
        let rows: Vec<CorpusRow> = sqlx::query_as(&sql)
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?;

        let Some(mut corpus) = aggregate_one::<Corpus>(&rows, ctx)? else {
            return Ok(None);
        };

        let coauthors: Vec<CoauthorRow> = sqlx::query_as(
            r#"
            SELECT ba.book_id, p.person_id, p.last_name, p.first_and_middle_names,
                   p.titles, p.credentials
            FROM book_authors AS ba
            JOIN persons AS p ON ba.person_id = p.person_id
            WHERE ba.book_id IN (SELECT book_id FROM book_authors WHERE person_id = ?)
            ORDER BY ba.book_id, ba.person_order
            "#,
        )
        .bind(person_id)
        .fetch_all(&mut *conn)
        .await?;

        corpus.add_coauthors(&coauthors)?;
        Ok(Some(corpus))
    }
}
