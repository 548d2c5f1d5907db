//! API error type mapped onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use taskdeck_database::DatabaseError;
use taskdeck_notify::NotifyError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::InvalidSession | DatabaseError::SessionExpired => {
                Self::unauthorized(value.to_string())
            }
            DatabaseError::NotFound(_) => Self::not_found(value.to_string()),
            DatabaseError::Duplicate(_) => Self::bad_request(value.to_string()),
            other => {
                error!(error = %other, "database error");
                Self::internal_server_error("database error")
            }
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(value: NotifyError) -> Self {
        error!(error = %value, "notification fan-out failed");
        Self::internal_server_error("failed to record notification")
    }
}
