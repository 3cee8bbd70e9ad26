//! Persons repository

use serde::Deserialize;
use sqlx::SqlitePool;

use super::{check_path_id, required_text};
use crate::catalog::Person;
use crate::catalog::names::{self, blank_to_none};
use crate::error::ApiResult;

/// A stored person row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonRecord {
    pub person_id: i64,
    pub last_name: String,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    pub is_organization: bool,
    pub sortable_name: Option<String>,
    pub notes: Option<String>,
}

impl From<PersonRecord> for Person {
    fn from(record: PersonRecord) -> Self {
        Person::new(
            record.person_id,
            record.last_name,
            record.first_and_middle_names,
            record.titles,
            record.credentials,
            record.is_organization,
            record.sortable_name,
            record.notes,
        )
    }
}

const PERSON_SELECT: &str = r#"
    SELECT person_id, last_name, first_and_middle_names, titles, credentials,
           is_organization, sortable_name, notes
    FROM persons
"#;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub person_id: Option<i64>,
    pub last_name: Option<String>,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    #[serde(default)]
    pub is_organization: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePerson {
    pub last_name: String,
    pub first_and_middle_names: Option<String>,
    pub titles: Option<String>,
    pub credentials: Option<String>,
    pub is_organization: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePerson {
    pub person_id: i64,
    pub person: CreatePerson,
}

impl CreatePerson {
    pub fn sortable_name(&self) -> String {
        names::sortable_name(&self.last_name, self.first_and_middle_names.as_deref())
    }
}

impl TryFrom<PersonInput> for CreatePerson {
    type Error = crate::error::ApiError;

    fn try_from(input: PersonInput) -> ApiResult<Self> {
        Ok(Self {
            last_name: required_text(input.last_name, "lastName")?,
            first_and_middle_names: blank_to_none(input.first_and_middle_names),
            titles: blank_to_none(input.titles),
            credentials: blank_to_none(input.credentials),
            is_organization: input.is_organization,
            notes: blank_to_none(input.notes),
        })
    }
}

impl UpdatePerson {
    pub fn from_input(input: PersonInput, path_id: i64) -> ApiResult<Self> {
        Ok(Self {
            person_id: check_path_id(input.person_id, path_id, "personId")?,
            person: CreatePerson::try_from(input)?,
        })
    }
}

pub struct PersonRepository {
    pool: SqlitePool,
}

impl PersonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> ApiResult<Vec<Person>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{PERSON_SELECT} ORDER BY sortable_name, person_id");
        let records: Vec<PersonRecord> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(records.into_iter().map(Person::from).collect())
    }

    pub async fn get(&self, person_id: i64) -> ApiResult<Option<Person>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{PERSON_SELECT} WHERE person_id = ?");
        let record: Option<PersonRecord> = sqlx::query_as(&sql)
            .bind(person_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(record.map(Person::from))
    }

    pub async fn create(&self, person: &CreatePerson) -> ApiResult<i64> {
        let mut conn = self.pool.acquire().await?;
        let person_id = sqlx::query(
            r#"
            INSERT INTO persons (
                last_name, first_and_middle_names, titles, credentials,
                is_organization, sortable_name, notes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&person.last_name)
        .bind(&person.first_and_middle_names)
        .bind(&person.titles)
        .bind(&person.credentials)
        .bind(person.is_organization)
        .bind(person.sortable_name())
        .bind(&person.notes)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        tracing::info!(person_id, last_name = %person.last_name, "Created person");
        Ok(person_id)
    }

    pub async fn update(&self, update: &UpdatePerson) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let person = &update.person;
        let result = sqlx::query(
            r#"
            UPDATE persons
            SET last_name = ?, first_and_middle_names = ?, titles = ?, credentials = ?,
                is_organization = ?, sortable_name = ?, notes = ?
            WHERE person_id = ?
            "#,
        )
        .bind(&person.last_name)
        .bind(&person.first_and_middle_names)
        .bind(&person.titles)
        .bind(&person.credentials)
        .bind(person.is_organization)
        .bind(person.sortable_name())
        .bind(&person.notes)
        .bind(update.person_id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, person_id: i64) -> ApiResult<bool> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM persons WHERE person_id = ?")
            .bind(person_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
