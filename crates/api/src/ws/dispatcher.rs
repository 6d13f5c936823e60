use axum::extract::ws::Message;
use futures::SinkExt;
use huddle_protocol::ServerEvent;
use tracing::{debug, warn};

use super::storage::WsStorage;

/// Sends an event to a single socket. Missing or dead connections are logged
/// and skipped; nothing is retried.
pub async fn send_to_socket(ws_storage: &WsStorage, socket_id: &str, event: &ServerEvent) {
    let Ok(text) = serde_json::to_string(event) else {
        warn!(%socket_id, "Failed to serialize server event");
        return;
    };

    let Some(sender) = ws_storage.get(socket_id) else {
        debug!(%socket_id, "No connection for socket, event dropped");
        return;
    };

    let mut guard = sender.lock().await;
    if let Err(e) = guard.send(Message::text(text)).await {
        warn!(%socket_id, %e, "Failed to send WS event");
    }
}

/// Broadcasts an event to every listed socket.
pub async fn broadcast(ws_storage: &WsStorage, socket_ids: &[String], event: &ServerEvent) {
    for socket_id in socket_ids {
        send_to_socket(ws_storage, socket_id, event).await;
    }
}
