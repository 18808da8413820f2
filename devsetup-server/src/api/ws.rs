//! Progress WebSocket
//!
//! Streams the progress events of every batch to connected clients as JSON
//! text frames. Clients only listen; inbound frames other than close are
//! ignored.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use devsetup_core::domain::progress::ProgressEvent;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::state::AppState;

/// GET /api/install/events
/// Upgrade to a WebSocket carrying progress events
pub async fn progress_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let events = state.installer.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, mut events: broadcast::Receiver<ProgressEvent>) {
    let conn_id = uuid::Uuid::new_v4();
    tracing::info!("Progress subscriber {} connected", conn_id);

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Progress subscriber {} lagged, skipped {} event(s)",
                        conn_id,
                        skipped
                    );
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize progress event: {}", e);
                    continue;
                }
            };

            if sink.send(Message::Text(text.into())).await.is_err() {
                tracing::debug!("Progress subscriber {} sink closed", conn_id);
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Progress subscriber {} receive error: {}", conn_id, e);
                break;
            }
        }
    }

    send_task.abort();
    tracing::info!("Progress subscriber {} disconnected", conn_id);
}
