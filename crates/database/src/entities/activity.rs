//! Activity log entity. Append-only per-project audit records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub action: String,
    pub details: Option<String>,
    pub created_at: String,
}
