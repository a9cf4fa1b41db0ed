use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::NotificationError;
use crate::models::PushEvent;

pub type ConnectionSender = mpsc::UnboundedSender<Message>;

/// Handle to one live, push-capable connection. The sender feeds the
/// connection's writer task; cloning is cheap.
#[derive(Debug, Clone)]
pub struct LiveConnection {
    id: Uuid,
    sender: ConnectionSender,
}

impl LiveConnection {
    pub fn new(id: Uuid, sender: ConnectionSender) -> Self {
        Self { id, sender }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Serialize and enqueue one push frame. Non-blocking; the writer task
    /// drains the channel independently of the caller.
    pub fn push(&self, event: &PushEvent) -> Result<(), NotificationError> {
        let frame = serde_json::to_string(event)?;
        self.sender
            .send(Message::Text(frame.into()))
            .map_err(|_| NotificationError::ConnectionClosed)
    }
}

/// Tracks which users currently have a live connection open, and through
/// which channel to reach them. At most one binding per user; a new
/// registration for the same user silently replaces the previous one, so a
/// second browser tab orphans the first.
pub struct ConnectionRegistry {
    bindings: RwLock<HashMap<Uuid, LiveConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Unconditionally (re)bind `user_id` to `connection`. Idempotent, no
    /// error conditions.
    pub async fn register(&self, user_id: Uuid, connection: LiveConnection) {
        let mut bindings = self.bindings.write().await;
        if let Some(previous) = bindings.insert(user_id, connection) {
            debug!(
                "Replaced connection {} for user {}",
                previous.id(),
                user_id
            );
        }
    }

    /// Remove the binding whose connection id matches; no-op when no binding
    /// does. Scans all bindings, which is fine: fan-out, not disconnect, is
    /// the hot path.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut bindings = self.bindings.write().await;
        bindings.retain(|_, connection| connection.id() != connection_id);
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<LiveConnection> {
        let bindings = self.bindings.read().await;
        bindings.get(&user_id).cloned()
    }

    pub async fn connected_count(&self) -> usize {
        self.bindings.read().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
