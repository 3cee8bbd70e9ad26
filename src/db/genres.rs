//! Genres repository

use serde::Deserialize;
use sqlx::SqlitePool;

use super::{check_path_id, required_text};
use crate::catalog::{Genre, aggregate, aggregate_one};
use crate::error::ApiResult;

/// One row per genre x tag.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct GenreRow {
    pub genre_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub tag_id: Option<i64>,
    pub tag_name: Option<String>,
}

const GENRE_SELECT: &str = r#"
    SELECT g.genre_id, g.name, g.short_name, t.tag_id, t.name AS tag_name
    FROM genres AS g
    LEFT JOIN tags AS t ON t.genre_id = g.genre_id
"#;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTagName {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInput {
    pub genre_id: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub tags: Option<Vec<NewTagName>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateGenre {
    pub name: String,
    pub short_name: String,
    /// Tag names created alongside the genre.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGenre {
    pub genre_id: i64,
    pub name: String,
    pub short_name: String,
}

impl TryFrom<GenreInput> for CreateGenre {
    type Error = crate::error::ApiError;

    fn try_from(input: GenreInput) -> ApiResult<Self> {
        let tags = input
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| required_text(tag.name, "tag name"))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(Self {
            name: required_text(input.name, "name")?,
            short_name: required_text(input.short_name, "shortName")?,
            tags,
        })
    }
}

impl UpdateGenre {
    pub fn from_input(input: GenreInput, path_id: i64) -> ApiResult<Self> {
        Ok(Self {
            genre_id: check_path_id(input.genre_id, path_id, "genreId")?,
            name: required_text(input.name, "name")?,
            short_name: required_text(input.short_name, "shortName")?,
        })
    }
}

pub struct GenreRepository {
    pool: SqlitePool,
}

impl GenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All genres with their tags, by genre name then tag name.
    pub async fn list(&self) -> ApiResult<Vec<Genre>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{GENRE_SELECT} ORDER BY g.name, g.genre_id, t.name");
        let rows: Vec<GenreRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(aggregate(&rows, &())?)
    }

    pub async fn get(&self, genre_id: i64) -> ApiResult<Option<Genre>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{GENRE_SELECT} WHERE g.genre_id = ? ORDER BY t.name");
        let rows: Vec<GenreRow> = sqlx::query_as(&sql)
            .bind(genre_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(aggregate_one(&rows, &())?)
    }

    pub async fn create(&self, genre: &CreateGenre) -> ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let genre_id = sqlx::query("INSERT INTO genres (name, short_name) VALUES (?, ?)")
            .bind(&genre.name)
            .bind(&genre.short_name)
            .execute(&mut *conn)
            .await?
            .last_insert_rowid();

        for tag in &genre.tags {
            sqlx::query("INSERT INTO tags (genre_id, name) VALUES (?, ?)")
                .bind(genre_id)
                .bind(tag)
                .execute(&mut *conn)
                .await?;
        }

        tracing::info!(genre_id, name = %genre.name, tags = genre.tags.len(), "Created genre");
        Ok(genre_id)
    }

    pub async fn update(&self, genre: &UpdateGenre) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE genres SET name = ?, short_name = ? WHERE genre_id = ?")
            .bind(&genre.name)
            .bind(&genre.short_name)
            .bind(genre.genre_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, genre_id: i64) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = ?")
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use assert_matches::assert_matches;

    #[test]
    fn test_create_requires_both_names() {
        let input = GenreInput {
            name: Some("Fiction".into()),
            ..Default::default()
        };
        assert_matches!(CreateGenre::try_from(input), Err(ApiError::Validation(_)));
    }

    #[test]
    fn test_create_carries_tag_names() {
        let input: GenreInput = serde_json::from_str(
            r#"{"name":"Fiction","shortName":"FIC","tags":[{"name":"Fantasy"},{"name":"Horror"}]}"#,
        )
        .unwrap();
        let genre = CreateGenre::try_from(input).unwrap();
        assert_eq!(genre.tags, vec!["Fantasy", "Horror"]);
    }
}
