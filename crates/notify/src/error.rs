//! Error types for the notification core.
//!
//! Only storage failure is fatal to a notify call. Transport and mail
//! failures are degraded outcomes: logged, never propagated.

use taskdeck_database::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to record notification: {0}")]
    Storage(#[from] DatabaseError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection outbox is full")]
    Backpressure,

    #[error("connection closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(String),

    #[error("mail provider returned status {0}")]
    Status(u16),
}
