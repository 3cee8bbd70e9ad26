//! Tags repository

use serde::Deserialize;
use sqlx::SqlitePool;

use super::{check_path_id, required_text};
use crate::catalog::Tag;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInput {
    pub tag_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTag {
    pub genre_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTag {
    pub tag_id: i64,
    pub tag: CreateTag,
}

impl TryFrom<TagInput> for CreateTag {
    type Error = ApiError;

    fn try_from(input: TagInput) -> ApiResult<Self> {
        let genre_id = match input.genre_id {
            Some(id) if id > 0 => id,
            _ => return Err(ApiError::validation("genreId must be a positive integer")),
        };
        Ok(Self {
            genre_id,
            name: required_text(input.name, "name")?,
        })
    }
}

impl UpdateTag {
    pub fn from_input(input: TagInput, path_id: i64) -> ApiResult<Self> {
        Ok(Self {
            tag_id: check_path_id(input.tag_id, path_id, "tagId")?,
            tag: CreateTag::try_from(input)?,
        })
    }
}

pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Flat tag list by genre, then name.
    pub async fn list(&self) -> ApiResult<Vec<Tag>> {
        let mut conn = self.pool.acquire().await?;
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT tag_id, genre_id, name FROM tags ORDER BY genre_id, name",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(tags)
    }

    pub async fn get(&self, tag_id: i64) -> ApiResult<Option<Tag>> {
        let mut conn = self.pool.acquire().await?;
        let tag = sqlx::query_as::<_, Tag>("SELECT tag_id, genre_id, name FROM tags WHERE tag_id = ?")
            .bind(tag_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(tag)
    }

    pub async fn create(&self, tag: &CreateTag) -> ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let tag_id = sqlx::query("INSERT INTO tags (genre_id, name) VALUES (?, ?)")
            .bind(tag.genre_id)
            .bind(&tag.name)
            .execute(&mut *conn)
            .await?
            .last_insert_rowid();
        tracing::info!(tag_id, genre_id = tag.genre_id, "Created tag");
        Ok(tag_id)
    }

    pub async fn update(&self, update: &UpdateTag) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("UPDATE tags SET genre_id = ?, name = ? WHERE tag_id = ?")
            .bind(update.tag.genre_id)
            .bind(&update.tag.name)
            .bind(update.tag_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, tag_id: i64) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM tags WHERE tag_id = ?")
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_genre_id_must_be_positive() {
        for genre_id in [None, Some(0), Some(-4)] {
            let input = TagInput {
                genre_id,
                name: Some("Epic".into()),
                ..Default::default()
            };
            assert_matches!(CreateTag::try_from(input), Err(ApiError::Validation(_)));
        }
    }

    #[test]
    fn test_update_checks_path() {
        let input = TagInput {
            tag_id: Some(9),
            genre_id: Some(2),
            name: Some("Epic".into()),
        };
        assert_matches!(UpdateTag::from_input(input.clone(), 8), Err(ApiError::Validation(_)));
        let update = UpdateTag::from_input(input, 9).unwrap();
        assert_eq!(update.tag.genre_id, 2);
    }
}
