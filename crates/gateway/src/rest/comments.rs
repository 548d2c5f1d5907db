//! Comment endpoints. Adding a comment always refreshes the task room;
//! whether it also notifies depends on the task having an assignee.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, util::require_bearer};
use taskdeck_database::{Comment, NotificationKind};
use taskdeck_notify::NotifyEvent;

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<CommentsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    let task = state
        .tasks()
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;

    let comments = state.comments().list_by_task(task.id).await?;

    Ok(Json(CommentsResponse { comments }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: Comment,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let body = payload.body.trim();
    if body.is_empty() {
        return Err(ApiError::bad_request("comment body is required"));
    }

    let task = state
        .tasks()
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;

    let comment = state.comments().create(task.id, user.id, body).await?;

    // Every current viewer refreshes, including the author.
    state.notifier.broadcast_new_comment(task.id).await;

    // The assignee, if any, gets the full fan-out; the notifier suppresses
    // the case where the assignee wrote the comment themselves.
    if let Some(assignee) = task.assigned_to {
        state
            .notifier
            .notify(NotifyEvent {
                recipient_id: assignee,
                actor_id: user.id,
                kind: NotificationKind::Comment,
                message: "You have a new comment on a task.".to_string(),
                link: Some(format!("/tasks/{}", task.id)),
                email_subject: "New comment on your assigned task".to_string(),
                task_title: task.title.clone(),
                project_name: None,
            })
            .await?;
    }

    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}
