//! Append-only activity log per project.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::Activity;
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        project_id: i64,
        user_id: i64,
        action: &str,
        details: Option<&str>,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activities (project_id, user_id, action, details, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_recent(&self, project_id: i64, limit: i64) -> DatabaseResult<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT id, project_id, user_id, action, details, created_at
            FROM activities
            WHERE project_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }
}
