//! Durable notification store: the per-user record of delivery-worthy
//! events behind the in-app notification panel.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::entities::{Notification, NotificationKind};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new unread notification for `user_id`.
    ///
    /// Storage failure is surfaced to the caller; the notifier treats it as
    /// fatal for the whole fan-out.
    pub async fn create(
        &self,
        user_id: i64,
        kind: NotificationKind,
        message: &str,
        link: Option<&str>,
    ) -> DatabaseResult<Notification> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, kind, message, link, read, created_at)
            VALUES (?, ?, ?, ?, FALSE, ?)
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(message)
        .bind(link)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        Ok(Notification {
            id,
            user_id,
            kind,
            message: message.to_string(),
            link: link.map(str::to_string),
            read: false,
            created_at: now,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, message, link, read, created_at
            FROM notifications
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Newest-first bounded listing for the notification panel.
    pub async fn list_recent(&self, user_id: i64, limit: i64) -> DatabaseResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, kind, message, link, read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark one notification as read. Idempotent; unknown ids are a silent
    /// no-op rather than an error.
    pub async fn mark_read(&self, id: i64) -> DatabaseResult<()> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn unread_count(&self, user_id: i64) -> DatabaseResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read = FALSE")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
