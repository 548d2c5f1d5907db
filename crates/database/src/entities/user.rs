//! User entity. Account lifecycle (registration, credentials) is owned by
//! external tooling; the backend only reads users for membership checks and
//! email rendering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}
