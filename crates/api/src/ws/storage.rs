use axum::extract::ws::{Message, WebSocket};
use dashmap::DashMap;
use futures::stream::SplitSink;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Tracks all active WebSocket connections by socket id. The socket id is the
/// participant identity everywhere else in the system, so one entry per id.
pub struct WsStorage {
    connections: DashMap<String, WsSender>,
}

impl WsStorage {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn add(&self, socket_id: String, sender: WsSender) {
        self.connections.insert(socket_id, sender);
    }

    pub fn remove(&self, socket_id: &str) {
        self.connections.remove(socket_id);
    }

    pub fn get(&self, socket_id: &str) -> Option<WsSender> {
        self.connections.get(socket_id).map(|s| s.clone())
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for WsStorage {
    fn default() -> Self {
        Self::new()
    }
}
