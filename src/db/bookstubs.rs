//! Book stub queries
//!
//! Stubs are read-only: one row per book x author x genre x series, ordered
//! so that rows of a book are contiguous and authors keep their link order.

use sqlx::SqlitePool;

use crate::catalog::{BookStub, NamingPolicy, Page, aggregate_one, aggregate_page};
use crate::error::ApiResult;

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct BookStubRow {
    pub book_id: Option<i64>,
    pub full_title: Option<String>,
    pub price: Option<f64>,
    pub person_id: Option<i64>,
    pub last_name: Option<String>,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    pub genre_id: Option<i64>,
    pub genre_name: Option<String>,
    pub genre_short_name: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,
    pub series_id: Option<i64>,
    pub series_title: Option<String>,
    pub series_volume: Option<i64>,
}

const STUB_SELECT: &str = r#"
    SELECT b.book_id, b.full_title, v.price,
           a.person_id, a.last_name, a.first_and_middle_names, a.titles, a.credentials,
           g.genre_id, g.name AS genre_name, g.short_name AS genre_short_name,
           t.tag_id, t.name AS tag_name,
           s.series_id, s.full_title AS series_title, bs.volume AS series_volume
    FROM books AS b
    LEFT JOIN versions AS v ON b.book_id = v.book_id
    LEFT JOIN book_authors AS ba ON b.book_id = ba.book_id
    LEFT JOIN persons AS a ON ba.person_id = a.person_id
    LEFT JOIN book_genres AS bg ON b.book_id = bg.book_id
    LEFT JOIN genres AS g ON bg.genre_id = g.genre_id
    LEFT JOIN tags AS t ON bg.tag_id = t.tag_id
    LEFT JOIN book_series AS bs ON b.book_id = bs.book_id
    LEFT JOIN series AS s ON bs.series_id = s.series_id
"#;

pub struct BookStubRepository {
    pool: SqlitePool,
}

impl BookStubRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, policy: NamingPolicy, page: Page) -> ApiResult<Vec<BookStub>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{STUB_SELECT} ORDER BY b.sortable_title, b.book_id, ba.person_order");
        let rows: Vec<BookStubRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        tracing::debug!(rows = rows.len(), start = page.start, num = page.num, "Fetched book stub rows");
        Ok(aggregate_page(&rows, &policy, page)?)
    }

    pub async fn get(&self, book_id: i64, policy: NamingPolicy) -> ApiResult<Option<BookStub>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{STUB_SELECT} WHERE b.book_id = ? ORDER BY ba.person_order");
        let rows: Vec<BookStubRow> = sqlx::query_as(&sql)
            .bind(book_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(aggregate_one(&rows, &policy)?)
    }
}
