//! Websocket endpoint of the real-time channel.
//!
//! Each socket is split in two tasks. The writer drains the connection's hub
//! queue into the sink; the reader parses client frames and updates the
//! connection's scope. When either side ends, the other is aborted and the
//! connection leaves the hub.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use common::{ClientMessage, ServerMessage};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::hub::{ConnectionId, Hub};
use crate::state::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let (id, mut outbound) = hub.connect();
    info!(connection_id = %id, "Websocket connection opened");

    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => handle_frame(&reader_hub, id, text.as_str()),
                Ok(Message::Binary(_)) => {
                    reader_hub.send_to(
                        id,
                        &ServerMessage::Error {
                            message: "Binary frames are not supported".into(),
                        },
                    );
                }
                Ok(Message::Close(_)) => break,
                // Control frames are answered by axum.
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    debug!(connection_id = %id, error = %e, "Websocket read failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.leave(id);
    info!(connection_id = %id, "Websocket connection closed");
}

fn handle_frame(hub: &Hub, id: ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(connection_id = %id, error = %e, "Malformed client message");
            hub.send_to(
                id,
                &ServerMessage::Error {
                    message: format!("Malformed message: {e}"),
                },
            );
            return;
        }
    };

    match message {
        ClientMessage::JoinEvent {
            event_id,
            participant_id,
        } => {
            if hub.join(id, event_id, participant_id) {
                hub.send_to(
                    id,
                    &ServerMessage::Joined {
                        event_id,
                        participant_id,
                    },
                );
            }
        }
        ClientMessage::LeaveEvent => {
            hub.unjoin(id);
        }
        ClientMessage::Ping => {
            hub.send_to(id, &ServerMessage::Pong);
        }
    }
}
