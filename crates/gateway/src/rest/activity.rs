//! Per-project activity feed.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::{error::ApiError, state::AppState, util::require_bearer};
use taskdeck_database::Activity;

const FEED_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

pub async fn project_activity(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ActivitiesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let _ = state.authenticate(&token).await?;

    let project = state
        .projects()
        .find_by_id(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;

    let activities = state.activities().list_recent(project.id, FEED_LIMIT).await?;

    Ok(Json(ActivitiesResponse { activities }))
}
