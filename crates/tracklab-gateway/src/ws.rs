//! WebSocket endpoint for the real-time notification stream.
//!
//! The frontend connects to `/ws/notifications` on startup and receives push
//! messages:
//!   - activity_logged → refresh dashboard counts
//!   - summary_ready   → show the daily analysis
//!   - plan_updated    → refetch plan data
//!   - notification    → show the activity popup / daily note prompt
//!
//! Client → server messages are ignored; the stream is one-way.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use super::server::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (id, mut events) = state.hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(payload) => {
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // keep-alives and stray client chatter
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.unsubscribe(id);
}
