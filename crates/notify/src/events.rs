//! Wire events exchanged over the live transport.

use serde::{Deserialize, Serialize};

/// Events a client may send after opening a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Bind this connection to a user so targeted pushes can reach it.
    RegisterUser { user_id: i64 },
    /// Subscribe this connection to a task's room.
    JoinTask { task_id: i64 },
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Room members should refresh the task's comment list.
    NewComment { task_id: i64 },
    /// The targeted user should refresh their notification panel.
    Notify,
}
