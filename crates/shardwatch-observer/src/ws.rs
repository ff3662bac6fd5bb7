//! `WebSocket` stream of change events.
//!
//! Clients connect to `GET /ws/artifacts` and receive every
//! `artifactsUpdated` event as a JSON text frame:
//! `{"event": "artifactsUpdated", "payload": {"old": [..], "new": [..]}}`.
//! A client that falls behind skips to the newest event.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use shardwatch_core::ArtifactContext;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Upgrade to a `WebSocket` and start streaming change events.
///
/// # Route
///
/// `GET /ws/artifacts`
pub async fn ws_artifacts(
    ws: WebSocketUpgrade,
    State(ctx): State<ArtifactContext>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, ctx))
}

async fn handle_ws(mut socket: WebSocket, ctx: ArtifactContext) {
    debug!("WebSocket client connected");

    let mut rx = ctx.subscribe();

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize change event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Hook channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
