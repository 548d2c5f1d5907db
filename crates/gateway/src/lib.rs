mod error;
mod state;
mod util;

pub mod rest;
pub mod websocket;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(rest::health::health_check))
        // Notification panel
        .route("/api/notifications", get(rest::notifications::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(rest::notifications::unread_count),
        )
        .route(
            "/api/notifications/:notification_id/read",
            post(rest::notifications::mark_read),
        )
        // Projects
        .route("/api/projects", post(rest::projects::create_project))
        .route("/api/projects/:project_id", get(rest::projects::get_project))
        .route(
            "/api/projects/:project_id/members",
            post(rest::projects::invite_member),
        )
        .route(
            "/api/projects/:project_id/activity",
            get(rest::activity::project_activity),
        )
        .route(
            "/api/projects/:project_id/tasks",
            post(rest::tasks::create_task),
        )
        // Tasks
        .route("/api/tasks/:task_id", get(rest::tasks::get_task))
        .route("/api/tasks/:task_id/status", post(rest::tasks::update_status))
        .route(
            "/api/tasks/:task_id/comments",
            get(rest::comments::list_comments).post(rest::comments::create_comment),
        )
        // Live transport
        .route("/ws", get(websocket::live_websocket_handler))
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
