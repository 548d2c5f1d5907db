//! Bearer-token session resolution. Session issuance flows (login,
//! registration) live outside this backend; `issue` exists for tests and
//! operational seeding.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::entities::Session;
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a session for `user_id` valid for `ttl_seconds`.
    pub async fn issue(&self, user_id: i64, ttl_seconds: u64) -> DatabaseResult<Session> {
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let expires_at = (now + Duration::seconds(ttl_seconds.min(i64::MAX as u64) as i64)).to_rfc3339();
        let created_at = now.to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .bind(&created_at)
        .bind(&expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id: result.last_insert_rowid(),
            token,
            user_id,
            created_at,
            expires_at,
        })
    }

    /// Resolve a bearer token to its session, rejecting unknown and expired
    /// tokens.
    pub async fn validate(&self, token: &str) -> DatabaseResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token, user_id, created_at, expires_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::InvalidSession)?;

        let now = Utc::now().to_rfc3339();
        if session.expires_at <= now {
            return Err(DatabaseError::SessionExpired);
        }

        Ok(session)
    }
}
