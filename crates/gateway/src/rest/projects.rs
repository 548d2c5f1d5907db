//! Project endpoints: creation, detail, member invites.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, state::AppState, util::require_bearer};
use taskdeck_database::{Project, ProjectMember, Task};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    pub project: Project,
    pub tasks: Vec<Task>,
}

pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("project name is required"));
    }

    let project = state
        .projects()
        .create(name, payload.description.as_deref(), user.id)
        .await?;

    state
        .activities()
        .record(project.id, user.id, "created the project", Some(&project.name))
        .await?;

    Ok(Json(ProjectResponse { project }))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ProjectDetailResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    let project = state
        .projects()
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;

    let tasks = state.tasks().list_by_project(project.id).await?;

    Ok(Json(ProjectDetailResponse { project, tasks }))
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub username_or_email: String,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member: ProjectMember,
}

/// Add an existing user to the project. Only the project creator may
/// invite.
pub async fn invite_member(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<InviteMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let project = state
        .projects()
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;

    if project.created_by != user.id {
        return Err(ApiError::forbidden("only the project creator can invite members"));
    }

    let invitee = state
        .users()
        .find_by_username_or_email(payload.username_or_email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let member = state.projects().add_member(project.id, invitee.id).await?;

    state
        .activities()
        .record(project.id, user.id, "invited a member", Some(&invitee.username))
        .await?;

    Ok(Json(MemberResponse { member }))
}
