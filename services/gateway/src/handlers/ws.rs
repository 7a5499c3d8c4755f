//! WebSocket endpoint
//!
//! Each connection subscribes to the fan-out bus and forwards events as one
//! JSON text frame apiece. If the bus evicts the subscriber (slow consumer)
//! or the socket errors, the connection closes. Inbound frames other than
//! Close are ignored.

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::debug;

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut subscription = state.bus.subscribe();
    let subscriber_id = subscription.id();
    let (mut sender, mut receiver) = socket.split();
    debug!(subscriber = subscriber_id, "websocket client connected");

    loop {
        tokio::select! {
            event = subscription.recv() => {
                match event {
                    Some(event) => {
                        let Ok(frame) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if sender.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    // the bus evicted us for lagging
                    None => break,
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.bus.unsubscribe(subscriber_id);
    debug!(subscriber = subscriber_id, "websocket client disconnected");
}
