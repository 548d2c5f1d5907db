//! Shared application state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::error::ApiError;
use taskdeck_database::{
    ActivityRepository, CommentRepository, NotificationRepository, ProjectRepository,
    SessionRepository, TaskRepository, User, UserRepository,
};
use taskdeck_notify::{LiveHub, Mailer, Notifier, PresenceRegistry};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub presence: Arc<PresenceRegistry>,
    pub hub: Arc<LiveHub>,
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
        mail_timeout: Duration,
        public_url: String,
    ) -> Self {
        let presence = Arc::new(PresenceRegistry::new());
        let hub = Arc::new(LiveHub::new());
        let notifier = Arc::new(Notifier::new(
            NotificationRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            Arc::clone(&presence),
            Arc::clone(&hub),
            mailer,
            mail_timeout,
            public_url,
        ));

        Self {
            pool,
            presence,
            hub,
            notifier,
        }
    }

    /// Resolve a bearer token to its user. The session layer only resolves
    /// identity; issuing sessions happens outside this backend.
    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        let session = self.sessions().validate(token).await?;

        self.users()
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("session user no longer exists"))
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.pool.clone())
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.pool.clone())
    }

    pub fn tasks(&self) -> TaskRepository {
        TaskRepository::new(self.pool.clone())
    }

    pub fn comments(&self) -> CommentRepository {
        CommentRepository::new(self.pool.clone())
    }

    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.pool.clone())
    }

    pub fn activities(&self) -> ActivityRepository {
        ActivityRepository::new(self.pool.clone())
    }
}
