//! Event notifier: the single place where a domain event becomes a
//! persisted notification, a live push, and an outbound email.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::NotifyError;
use crate::events::ServerEvent;
use crate::hub::LiveHub;
use crate::mailer::{Mailer, OutboundEmail};
use crate::presence::PresenceRegistry;
use taskdeck_database::{Notification, NotificationKind, NotificationRepository, User, UserRepository};

/// A notification-worthy domain event, built by the CRUD handler that
/// observed it. Carries enough context to render the email.
#[derive(Debug, Clone)]
pub struct NotifyEvent {
    pub recipient_id: i64,
    pub actor_id: i64,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub email_subject: String,
    pub task_title: String,
    pub project_name: Option<String>,
}

pub struct Notifier {
    store: NotificationRepository,
    directory: UserRepository,
    presence: Arc<PresenceRegistry>,
    hub: Arc<LiveHub>,
    mailer: Arc<dyn Mailer>,
    mail_timeout: Duration,
    public_url: String,
}

impl Notifier {
    pub fn new(
        store: NotificationRepository,
        directory: UserRepository,
        presence: Arc<PresenceRegistry>,
        hub: Arc<LiveHub>,
        mailer: Arc<dyn Mailer>,
        mail_timeout: Duration,
        public_url: String,
    ) -> Self {
        Self {
            store,
            directory,
            presence,
            hub,
            mailer,
            mail_timeout,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Run the fan-out for one event.
    ///
    /// A user is never notified of their own action; that guard runs before
    /// anything else and suppresses all three effects. Persistence failure
    /// aborts the call: a live push or email must never fire for an event
    /// without a durable record behind it. Push and email are best-effort
    /// after that point.
    pub async fn notify(&self, event: NotifyEvent) -> Result<Option<Notification>, NotifyError> {
        if event.recipient_id == event.actor_id {
            debug!(user_id = event.recipient_id, "self-notification suppressed");
            return Ok(None);
        }

        let notification = self
            .store
            .create(
                event.recipient_id,
                event.kind,
                &event.message,
                event.link.as_deref(),
            )
            .await?;

        match self.presence.lookup(event.recipient_id).await {
            Some(connection_id) => {
                if let Err(error) = self.hub.emit_to_connection(connection_id, ServerEvent::Notify).await {
                    warn!(
                        user_id = event.recipient_id,
                        %error,
                        "live push failed, persisted record remains the source of truth"
                    );
                }
            }
            None => {
                debug!(user_id = event.recipient_id, "recipient offline, skipping live push");
            }
        }

        self.dispatch_email(event);

        Ok(Some(notification))
    }

    /// Room-scoped broadcast for a new comment, so every current viewer of
    /// the task refreshes its comment list. Independent of `notify` and not
    /// subject to the self-notification guard: the actor's own open view
    /// refreshes too.
    pub async fn broadcast_new_comment(&self, task_id: i64) {
        let delivered = self
            .hub
            .emit_to_room(task_id, ServerEvent::NewComment { task_id })
            .await;
        debug!(task_id, delivered, "new comment broadcast to task room");
    }

    /// Fire-and-forget email dispatch. The recipient address lookup and the
    /// send both run off the caller's path under a bounded timeout; failures
    /// are logged only.
    fn dispatch_email(&self, event: NotifyEvent) {
        let directory = self.directory.clone();
        let mailer = Arc::clone(&self.mailer);
        let deadline = self.mail_timeout;
        let public_url = self.public_url.clone();

        tokio::spawn(async move {
            let recipient = match directory.find_by_id(event.recipient_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(user_id = event.recipient_id, "email skipped, recipient not in user directory");
                    return;
                }
                Err(error) => {
                    warn!(user_id = event.recipient_id, %error, "email skipped, user directory lookup failed");
                    return;
                }
            };

            let email = render_email(&event, &recipient, &public_url);
            match timeout(deadline, mailer.send(&email)).await {
                Ok(Ok(())) => debug!(to = %email.to, "notification email dispatched"),
                Ok(Err(error)) => warn!(to = %email.to, %error, "notification email failed"),
                Err(_) => warn!(to = %email.to, "notification email timed out"),
            }
        });
    }
}

fn render_email(event: &NotifyEvent, recipient: &User, public_url: &str) -> OutboundEmail {
    let mut body = format!("<p>Hello {},</p>", recipient.username);

    match event.kind {
        NotificationKind::Assignment => {
            body.push_str(&format!(
                "<p>You have been assigned a new task: <b>{}</b>",
                event.task_title
            ));
            if let Some(project) = &event.project_name {
                body.push_str(&format!(" in project <b>{project}</b>"));
            }
            body.push_str(".</p>");
        }
        NotificationKind::Comment => {
            body.push_str(&format!(
                "<p>You have a new comment on the task: <b>{}</b>.</p>",
                event.task_title
            ));
        }
    }

    if let Some(link) = &event.link {
        body.push_str(&format!("<p><a href=\"{public_url}{link}\">View Task</a></p>"));
    }

    OutboundEmail {
        to: recipient.email.clone(),
        subject: event.email_subject.clone(),
        html_body: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_email_includes_project_and_link() {
        let recipient = User {
            id: 2,
            username: "grace".to_string(),
            email: "grace@example.com".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let event = NotifyEvent {
            recipient_id: 2,
            actor_id: 1,
            kind: NotificationKind::Assignment,
            message: "You have been assigned a new task: Ship it".to_string(),
            link: Some("/tasks/7".to_string()),
            email_subject: "You have been assigned a new task".to_string(),
            task_title: "Ship it".to_string(),
            project_name: Some("Apollo".to_string()),
        };

        let email = render_email(&event, &recipient, "http://localhost:7080");

        assert_eq!(email.to, "grace@example.com");
        assert!(email.html_body.contains("Hello grace"));
        assert!(email.html_body.contains("<b>Ship it</b>"));
        assert!(email.html_body.contains("<b>Apollo</b>"));
        assert!(email.html_body.contains("http://localhost:7080/tasks/7"));
    }

    #[test]
    fn comment_email_omits_link_when_absent() {
        let recipient = User {
            id: 2,
            username: "grace".to_string(),
            email: "grace@example.com".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let event = NotifyEvent {
            recipient_id: 2,
            actor_id: 1,
            kind: NotificationKind::Comment,
            message: "You have a new comment on a task.".to_string(),
            link: None,
            email_subject: "New comment on your assigned task".to_string(),
            task_title: "Ship it".to_string(),
            project_name: None,
        };

        let email = render_email(&event, &recipient, "http://localhost:7080");

        assert!(email.html_body.contains("new comment on the task"));
        assert!(!email.html_body.contains("<a href"));
    }
}
