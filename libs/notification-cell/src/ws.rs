use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::handlers::NotificationState;
use crate::registry::{ConnectionRegistry, LiveConnection};

/// Frames a client may send over the live channel. Registration carries the
/// user id; disconnecting needs no payload, the transport close is enough.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ClientFrame {
    Register { user_id: Uuid },
}

/// GET /ws — upgrade to the live push channel.
pub async fn ws_upgrade(
    State(state): State<NotificationState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, state.registry.clone()))
}

async fn run_connection(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let connection_id = Uuid::new_v4();
    info!("Socket connected: {}", connection_id);

    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // The writer task owns the sink; everything headed for the client goes
    // through the channel, including dispatcher pushes.
    let writer = tokio::spawn(writer_task(ws_sender, rx));

    loop {
        match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(ClientFrame::Register { user_id }) => {
                        info!(
                            "Register event for user {} on socket {}",
                            user_id, connection_id
                        );
                        registry
                            .register(user_id, LiveConnection::new(connection_id, tx.clone()))
                            .await;
                    }
                    Err(e) => {
                        debug!(
                            "Ignoring unrecognized frame on socket {}: {}",
                            connection_id, e
                        );
                    }
                }
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = tx.send(Message::Pong(data));
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("Socket disconnected: {}", connection_id);
                break;
            }
            Some(Ok(_)) => {
                // Binary and pong frames carry nothing we use.
            }
            Some(Err(e)) => {
                warn!("Socket {} receive error: {}", connection_id, e);
                break;
            }
        }
    }

    registry.unregister(connection_id).await;
    writer.abort();
    debug!("{} live connections remain", registry.connected_count().await);
}

async fn writer_task(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // The socket is gone; the registry entry is cleaned up by the
            // reader loop when its half ends.
            break;
        }
    }
}
