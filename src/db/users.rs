//! Identity store: users and their roles
//!
//! Lookups are by normalized (upper-cased) email. A user with several roles
//! comes back as one row per role.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::sqlite_helpers::now_iso8601;
use crate::error::ApiResult;

// ============================================================================
// Records
// ============================================================================

/// One row per user x role. `role_name` is NULL for a user without roles.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdentityRow {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    /// Role names; unknown roles are ignored.
    pub roles: Vec<String>,
}

pub fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

// ============================================================================
// Repository
// ============================================================================

pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Vec<IdentityRow>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT u.user_id, u.email, u.display_name, u.password_hash,
                   r.normalized_name AS role_name
            FROM users AS u
            LEFT JOIN user_roles AS ur ON u.user_id = ur.user_id
            LEFT JOIN roles AS r ON ur.role_id = r.role_id
            WHERE u.normalized_email = ?
            ORDER BY r.normalized_name
            "#,
        )
        .bind(normalize(email))
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Create a user, or replace the password, name and roles of an existing
    /// user with the same email. Returns the user id.
    pub async fn upsert(&self, user: &CreateUser) -> ApiResult<String> {
        let mut conn = self.pool.acquire().await?;
        let normalized_email = normalize(&user.email);

        let existing: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM users WHERE normalized_email = ?")
                .bind(&normalized_email)
                .fetch_optional(&mut *conn)
                .await?;

        let user_id = match existing {
            Some(user_id) => {
                sqlx::query(
                    "UPDATE users SET email = ?, display_name = ?, password_hash = ? WHERE user_id = ?",
                )
                .bind(&user.email)
                .bind(&user.display_name)
                .bind(&user.password_hash)
                .bind(&user_id)
                .execute(&mut *conn)
                .await?;
                sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
                    .bind(&user_id)
                    .execute(&mut *conn)
                    .await?;
                user_id
            }
            None => {
                let user_id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO users (user_id, email, normalized_email, display_name, password_hash, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&user_id)
                .bind(&user.email)
                .bind(&normalized_email)
                .bind(&user.display_name)
                .bind(&user.password_hash)
                .bind(now_iso8601())
                .execute(&mut *conn)
                .await?;
                user_id
            }
        };

        for role in &user.roles {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO user_roles (user_id, role_id)
                SELECT ?, role_id FROM roles WHERE normalized_name = ?
                "#,
            )
            .bind(&user_id)
            .bind(normalize(role))
            .execute(&mut *conn)
            .await?;
        }

        tracing::info!(user_id = %user_id, roles = ?user.roles, "Saved identity user");
        Ok(user_id)
    }
}
