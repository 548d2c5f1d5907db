//! User lookups for membership checks and email rendering.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::User;
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, username: &str, email: &str) -> DatabaseResult<User> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(db) = &error {
                if db.message().contains("UNIQUE") {
                    return DatabaseError::Duplicate("user");
                }
            }
            DatabaseError::Query(error)
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Resolve a member-invite handle, which may be either a username or an
    /// email address.
    pub async fn find_by_username_or_email(&self, handle: &str) -> DatabaseResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, created_at, updated_at
            FROM users
            WHERE username = ? OR email = ?
            "#,
        )
        .bind(handle)
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
