//! Scenario tests for the event notifier against a real sqlite store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::sleep;

use taskdeck_config::DatabaseConfig;
use taskdeck_database::{
    prepare_database, run_migrations, NotificationKind, NotificationRepository, UserRepository,
};
use taskdeck_notify::{
    LiveHub, MailError, Mailer, Notifier, NotifyError, NotifyEvent, OutboundEmail,
    PresenceRegistry, ServerEvent,
};

/// Mailer that records every send instead of delivering anything.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct TestHarness {
    pool: sqlx::SqlitePool,
    store: NotificationRepository,
    users: UserRepository,
    presence: Arc<PresenceRegistry>,
    hub: Arc<LiveHub>,
    mailer: Arc<RecordingMailer>,
    notifier: Notifier,
    _db_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("notify-test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
        };

        let pool = prepare_database(&config).await.expect("prepare database");
        run_migrations(&pool).await.expect("run migrations");

        let store = NotificationRepository::new(pool.clone());
        let users = UserRepository::new(pool.clone());
        let presence = Arc::new(PresenceRegistry::new());
        let hub = Arc::new(LiveHub::new());
        let mailer = Arc::new(RecordingMailer::default());

        let notifier = Notifier::new(
            store.clone(),
            users.clone(),
            Arc::clone(&presence),
            Arc::clone(&hub),
            mailer.clone(),
            Duration::from_secs(2),
            "http://localhost:7080".to_string(),
        );

        Self {
            pool,
            store,
            users,
            presence,
            hub,
            mailer,
            notifier,
            _db_dir: db_dir,
        }
    }

    async fn seed_user(&self, username: &str) -> i64 {
        self.users
            .create(username, &format!("{username}@example.com"))
            .await
            .expect("seed user")
            .id
    }

    /// Poll until the mailer has recorded `count` emails or give up.
    async fn wait_for_emails(&self, count: usize) -> Vec<OutboundEmail> {
        for _ in 0..100 {
            let sent = self.mailer.sent();
            if sent.len() >= count {
                return sent;
            }
            sleep(Duration::from_millis(10)).await;
        }
        self.mailer.sent()
    }
}

fn comment_event(recipient_id: i64, actor_id: i64, task_id: i64) -> NotifyEvent {
    NotifyEvent {
        recipient_id,
        actor_id,
        kind: NotificationKind::Comment,
        message: "You have a new comment on a task.".to_string(),
        link: Some(format!("/tasks/{task_id}")),
        email_subject: "New comment on your assigned task".to_string(),
        task_title: "Ship the release".to_string(),
        project_name: Some("Apollo".to_string()),
    }
}

fn assignment_event(recipient_id: i64, actor_id: i64, task_id: i64) -> NotifyEvent {
    NotifyEvent {
        recipient_id,
        actor_id,
        kind: NotificationKind::Assignment,
        message: "You have been assigned a new task: Ship the release".to_string(),
        link: Some(format!("/tasks/{task_id}")),
        email_subject: "You have been assigned a new task".to_string(),
        task_title: "Ship the release".to_string(),
        project_name: Some("Apollo".to_string()),
    }
}

#[tokio::test]
async fn online_recipient_gets_record_push_email_and_room_broadcast() {
    // Scenario A: B comments on a task assigned to A while A is online.
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;
    let b = harness.seed_user("grace").await;

    let (tx_a, mut rx_a) = mpsc::channel(8);
    let conn_a = harness.hub.connect(tx_a).await;
    harness.presence.register(a, conn_a).await;
    harness.hub.join_room(conn_a, 7).await;

    harness.notifier.broadcast_new_comment(7).await;
    let created = harness
        .notifier
        .notify(comment_event(a, b, 7))
        .await
        .expect("notify succeeds")
        .expect("not suppressed");

    assert_eq!(created.user_id, a);
    assert_eq!(created.kind, NotificationKind::Comment);
    assert!(!created.read);

    let recent = harness.store.list_recent(a, 20).await.unwrap();
    assert_eq!(recent.len(), 1);

    assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::NewComment { task_id: 7 });
    assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::Notify);

    let sent = harness.wait_for_emails(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert_eq!(sent[0].subject, "New comment on your assigned task");
}

#[tokio::test]
async fn offline_recipient_still_gets_record_and_email() {
    // Scenario B: A has no registered connection; a viewer still gets the
    // room broadcast.
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;
    let b = harness.seed_user("grace").await;

    let (tx_viewer, mut rx_viewer) = mpsc::channel(8);
    let viewer_conn = harness.hub.connect(tx_viewer).await;
    harness.hub.join_room(viewer_conn, 7).await;

    harness.notifier.broadcast_new_comment(7).await;
    let created = harness
        .notifier
        .notify(comment_event(a, b, 7))
        .await
        .unwrap();

    assert!(created.is_some());
    assert_eq!(harness.store.unread_count(a).await.unwrap(), 1);

    // The viewer only sees the room broadcast, never the targeted push.
    assert_eq!(rx_viewer.try_recv().unwrap(), ServerEvent::NewComment { task_id: 7 });
    assert!(rx_viewer.try_recv().is_err());

    let sent = harness.wait_for_emails(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
}

#[tokio::test]
async fn self_notification_suppresses_every_effect() {
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;

    let (tx_a, mut rx_a) = mpsc::channel(8);
    let conn_a = harness.hub.connect(tx_a).await;
    harness.presence.register(a, conn_a).await;

    let outcome = harness.notifier.notify(assignment_event(a, a, 7)).await.unwrap();

    assert!(outcome.is_none());
    assert_eq!(harness.store.list_recent(a, 20).await.unwrap().len(), 0);
    assert!(rx_a.try_recv().is_err());

    sleep(Duration::from_millis(50)).await;
    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn storage_failure_gates_push_and_email() {
    // Scenario D: the store is unavailable; nothing downstream may fire.
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;
    let b = harness.seed_user("grace").await;

    let (tx_a, mut rx_a) = mpsc::channel(8);
    let conn_a = harness.hub.connect(tx_a).await;
    harness.presence.register(a, conn_a).await;

    harness.pool.close().await;

    let error = harness
        .notifier
        .notify(assignment_event(a, b, 7))
        .await
        .unwrap_err();

    assert!(matches!(error, NotifyError::Storage(_)));
    assert!(rx_a.try_recv().is_err());

    sleep(Duration::from_millis(50)).await;
    assert!(harness.mailer.sent().is_empty());
}

#[tokio::test]
async fn push_failure_is_degraded_not_fatal() {
    // The recipient's outbox is gone but the registry entry is stale; the
    // record and email still land.
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;
    let b = harness.seed_user("grace").await;

    let (tx_a, rx_a) = mpsc::channel(8);
    let conn_a = harness.hub.connect(tx_a).await;
    harness.presence.register(a, conn_a).await;
    drop(rx_a);

    let created = harness
        .notifier
        .notify(assignment_event(a, b, 7))
        .await
        .unwrap();

    assert!(created.is_some());
    assert_eq!(harness.store.unread_count(a).await.unwrap(), 1);

    let sent = harness.wait_for_emails(1).await;
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn displaced_connection_keeps_room_broadcasts_only() {
    // Two tabs for the same user: only the most recent registration gets the
    // targeted push, both get room broadcasts.
    let harness = TestHarness::new().await;
    let a = harness.seed_user("ada").await;
    let b = harness.seed_user("grace").await;

    let (tx_first, mut rx_first) = mpsc::channel(8);
    let (tx_second, mut rx_second) = mpsc::channel(8);
    let first = harness.hub.connect(tx_first).await;
    let second = harness.hub.connect(tx_second).await;

    harness.presence.register(a, first).await;
    harness.presence.register(a, second).await;
    harness.hub.join_room(first, 7).await;
    harness.hub.join_room(second, 7).await;

    harness.notifier.broadcast_new_comment(7).await;
    harness.notifier.notify(comment_event(a, b, 7)).await.unwrap();

    assert_eq!(rx_first.try_recv().unwrap(), ServerEvent::NewComment { task_id: 7 });
    assert!(rx_first.try_recv().is_err());

    assert_eq!(rx_second.try_recv().unwrap(), ServerEvent::NewComment { task_id: 7 });
    assert_eq!(rx_second.try_recv().unwrap(), ServerEvent::Notify);
}
