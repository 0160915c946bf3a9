//! WebSocket handler for real-time snapshot streaming

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::state::ApiState;

/// WebSocket upgrade handler
///
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: ApiState) {
    info!("WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the full-state burst so no update published
    // in between is missed; at-least-once delivery across the seam is fine.
    let mut event_rx = state.registry.subscribe();

    let monitors = state.registry.list().await;
    let init = serde_json::json!({
        "type": "init",
        "data": monitors,
    });

    if let Ok(text) = serde_json::to_string(&init)
        && sender.send(Message::Text(text)).await.is_err()
    {
        debug!("WebSocket send failed before init, client disconnected");
        return;
    }

    // Spawn task to forward snapshot events to the WebSocket
    let mut send_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let json = serde_json::json!({
                        "type": "update",
                        "data": event.snapshot,
                    });

                    if let Ok(text) = serde_json::to_string(&json)
                        && sender.send(Message::Text(text)).await.is_err()
                    {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }

                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // the client keeps getting newer snapshots, older ones
                    // are superseded anyway
                    warn!("WebSocket client lagged, skipped {skipped} updates");
                }

                Err(broadcast::error::RecvError::Closed) => {
                    debug!("broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Handle incoming messages; clients only ever close or ping
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                Message::Ping(_) => {
                    // Pong is automatically sent by axum
                    debug!("received ping");
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("WebSocket client disconnected");
}
