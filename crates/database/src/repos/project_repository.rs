//! Project and membership persistence.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::{Project, ProjectMember};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a project; the creator becomes its first member.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: i64,
    ) -> DatabaseResult<Project> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO projects (name, description, created_by, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(created_by)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let project_id = result.last_insert_rowid();

        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, added_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(created_by)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Project {
            id: project_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_by,
            created_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, created_by, created_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    pub async fn add_member(&self, project_id: i64, user_id: i64) -> DatabaseResult<ProjectMember> {
        if self.is_member(project_id, user_id).await? {
            return Err(DatabaseError::Duplicate("project member"));
        }

        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, added_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ProjectMember {
            project_id,
            user_id,
            added_at: now,
        })
    }

    pub async fn is_member(&self, project_id: i64, user_id: i64) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM project_members WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::UserRepository;
    use crate::run_migrations;
    use taskdeck_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_projects.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = crate::prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn creator_becomes_first_member() {
        let (pool, _dir) = create_test_pool().await;
        let user = UserRepository::new(pool.clone())
            .create("ada", "ada@example.com")
            .await
            .unwrap();
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Apollo", None, user.id).await.unwrap();

        assert!(repo.is_member(project.id, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn add_member_rejects_duplicates() {
        let (pool, _dir) = create_test_pool().await;
        let users = UserRepository::new(pool.clone());
        let ada = users.create("ada", "ada@example.com").await.unwrap();
        let grace = users.create("grace", "grace@example.com").await.unwrap();
        let repo = ProjectRepository::new(pool);

        let project = repo.create("Apollo", None, ada.id).await.unwrap();
        repo.add_member(project.id, grace.id).await.unwrap();

        let error = repo.add_member(project.id, grace.id).await.unwrap_err();
        assert!(matches!(error, DatabaseError::Duplicate(_)));
    }
}
