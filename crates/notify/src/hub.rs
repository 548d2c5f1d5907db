//! Live transport hub: the connection table and task rooms behind the
//! websocket endpoint.
//!
//! Each connection owns an mpsc outbox; the websocket handler drains it into
//! the socket. The hub supports two addressing modes: a targeted emit to one
//! connection and a broadcast to every connection in a task's room. Rooms
//! are join-only; membership disappears with the connection.

use std::collections::{HashMap, HashSet};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::TransportError;
use crate::events::ServerEvent;

/// Identifier assigned to each live connection.
pub type ConnectionId = Uuid;

#[derive(Default)]
pub struct LiveHub {
    inner: RwLock<HubInner>,
}

#[derive(Default)]
struct HubInner {
    connections: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    rooms: HashMap<i64, HashSet<ConnectionId>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new connection and hand back its identifier.
    pub async fn connect(&self, outbox: mpsc::Sender<ServerEvent>) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        let mut inner = self.inner.write().await;
        inner.connections.insert(connection_id, outbox);
        debug!(%connection_id, total = inner.connections.len(), "connection admitted");
        connection_id
    }

    /// Subscribe a connection to a task's room. A connection may join any
    /// number of rooms; there is no leave short of disconnecting.
    pub async fn join_room(&self, connection_id: ConnectionId, task_id: i64) {
        let mut inner = self.inner.write().await;
        inner.rooms.entry(task_id).or_default().insert(connection_id);
    }

    /// Deliver `event` to every connection in the task's room. Empty or
    /// unknown rooms deliver to nobody. Returns the delivery count.
    pub async fn emit_to_room(&self, task_id: i64, event: ServerEvent) -> usize {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(&task_id) else {
            return 0;
        };

        let mut delivered = 0;
        for connection_id in members {
            if let Some(outbox) = inner.connections.get(connection_id) {
                if outbox.try_send(event.clone()).is_ok() {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Deliver `event` to exactly one connection. A connection id that is no
    /// longer in the table is a no-op, not an error; only a rejected send on
    /// a live entry surfaces as `TransportError`.
    pub async fn emit_to_connection(
        &self,
        connection_id: ConnectionId,
        event: ServerEvent,
    ) -> Result<(), TransportError> {
        let inner = self.inner.read().await;
        let Some(outbox) = inner.connections.get(&connection_id) else {
            return Ok(());
        };

        outbox.try_send(event).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => TransportError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    /// Forget a connection: its outbox entry and every room membership.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        inner.connections.remove(&connection_id);
        inner.rooms.retain(|_, members| {
            members.remove(&connection_id);
            !members.is_empty()
        });
        debug!(%connection_id, total = inner.connections.len(), "connection removed");
    }

    /// Number of currently admitted connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}
