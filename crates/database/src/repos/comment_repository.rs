//! Comment persistence.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::Comment;
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task_id: i64, author_id: i64, body: &str) -> DatabaseResult<Comment> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO comments (task_id, author_id, body, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(body)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            task_id,
            author_id,
            body: body.to_string(),
            created_at: now,
        })
    }

    /// Conversation order: oldest first.
    pub async fn list_by_task(&self, task_id: i64) -> DatabaseResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, body, created_at
            FROM comments
            WHERE task_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
