//! Task endpoints. Creating a task with an assignee is a
//! notification-worthy event; status changes only feed the activity log.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, util::require_bearer};
use taskdeck_database::{NotificationKind, Task, TaskStatus};
use taskdeck_notify::NotifyEvent;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let project = state
        .projects()
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("task title is required"));
    }

    let task = state
        .tasks()
        .create(
            project.id,
            title,
            payload.description.as_deref(),
            payload.assigned_to,
            user.id,
        )
        .await?;

    state
        .activities()
        .record(project.id, user.id, "created a task", Some(&task.title))
        .await?;

    // Assigning someone is what makes creation notification-worthy; the
    // notifier itself suppresses self-assignment.
    if let Some(assignee) = task.assigned_to {
        state
            .notifier
            .notify(NotifyEvent {
                recipient_id: assignee,
                actor_id: user.id,
                kind: NotificationKind::Assignment,
                message: format!("You have been assigned a new task: {}", task.title),
                link: Some(format!("/tasks/{}", task.id)),
                email_subject: "You have been assigned a new task".to_string(),
                task_title: task.title.clone(),
                project_name: Some(project.name.clone()),
            })
            .await?;
    }

    Ok(Json(TaskResponse { task }))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<TaskResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    let task = state
        .tasks()
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;

    Ok(Json(TaskResponse { task }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let task = state
        .tasks()
        .update_status(task_id, payload.status)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;

    state
        .activities()
        .record(
            task.project_id,
            user.id,
            "moved a task",
            Some(&format!("{} to {}", task.title, task.status)),
        )
        .await?;

    Ok(Json(TaskResponse { task }))
}
