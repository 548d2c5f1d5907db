//! Task persistence.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::{Task, TaskStatus};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        project_id: i64,
        title: &str,
        description: Option<&str>,
        assigned_to: Option<i64>,
        created_by: i64,
    ) -> DatabaseResult<Task> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (project_id, title, description, status, assigned_to, created_by, created_at, updated_at)
            VALUES (?, ?, ?, 'todo', ?, ?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(title)
        .bind(description)
        .bind(assigned_to)
        .bind(created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            project_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            status: TaskStatus::Todo,
            assigned_to,
            created_by,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, assigned_to, created_by, created_at, updated_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    pub async fn list_by_project(&self, project_id: i64) -> DatabaseResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, assigned_to, created_by, created_at, updated_at
            FROM tasks
            WHERE project_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Update a task's status column, returning the refreshed row when the
    /// task exists.
    pub async fn update_status(&self, id: i64, status: TaskStatus) -> DatabaseResult<Option<Task>> {
        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await
    }
}
