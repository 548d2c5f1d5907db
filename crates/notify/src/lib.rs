//! Taskdeck notification core.
//!
//! Maps authenticated users to live connections (presence), carries the
//! connection table and task rooms (hub), and coordinates the
//! persist-then-push-then-email sequence for domain events (notifier).

pub mod error;
pub mod events;
pub mod hub;
pub mod mailer;
pub mod notifier;
pub mod presence;

pub use error::{MailError, NotifyError, TransportError};
pub use events::{ClientEvent, ServerEvent};
pub use hub::{ConnectionId, LiveHub};
pub use mailer::{HttpMailer, Mailer, NullMailer, OutboundEmail};
pub use notifier::{Notifier, NotifyEvent};
pub use presence::PresenceRegistry;
