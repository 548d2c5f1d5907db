//! Taskdeck database crate.
//!
//! Connection management, migrations, entities, and repository
//! implementations for the sqlite-backed store.

use sqlx::SqlitePool;
use taskdeck_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use entities::{
    Activity, Comment, Notification, NotificationKind, Project, ProjectMember, Session, Task,
    TaskStatus, User,
};

pub use repos::{
    ActivityRepository, CommentRepository, NotificationRepository, ProjectRepository,
    SessionRepository, TaskRepository, UserRepository,
};

pub use types::{DatabaseError, DatabaseResult};

/// Prepare the connection pool and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}
