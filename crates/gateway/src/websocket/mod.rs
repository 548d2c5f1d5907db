//! Websocket endpoint bridging sockets into the live hub and presence
//! registry.
//!
//! A connection is anonymous until the client sends `registerUser`; room
//! membership comes from explicit `joinTask` events. Both bindings die with
//! the connection: the cleanup below runs exactly once however the socket
//! loop exits, including abrupt network loss.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::AppState;
use taskdeck_notify::{ClientEvent, ServerEvent};

const OUTBOX_CAPACITY: usize = 64;

pub async fn live_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut receiver) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(OUTBOX_CAPACITY);
    let connection_id = state.hub.connect(out_tx).await;

    let send_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::RegisterUser { user_id }) => {
                    debug!(%connection_id, user_id, "connection registered for user");
                    state.presence.register(user_id, connection_id).await;
                }
                Ok(ClientEvent::JoinTask { task_id }) => {
                    debug!(%connection_id, task_id, "connection joined task room");
                    state.hub.join_room(connection_id, task_id).await;
                }
                Err(error) => {
                    warn!(%connection_id, %error, "ignoring malformed client event");
                }
            },
            Ok(Message::Close(_)) => break,
            Err(error) => {
                debug!(%connection_id, %error, "websocket receive error");
                break;
            }
            _ => {}
        }
    }

    state.presence.unregister(connection_id).await;
    state.hub.disconnect(connection_id).await;
    send_task.abort();
}
