use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::protocol::connected_message;
use crate::state::AppState;

/// Largest inbound message or frame accepted from a client (1 MiB).
pub const MAX_MESSAGE_SIZE: usize = 1 << 20;

/// Build the socket route: `GET /ws`
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// `GET /ws`: Upgrade to a gateway connection. Anyone may connect.
///
/// A message over [`MAX_MESSAGE_SIZE`] fails the read and ends the connection.
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .max_frame_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_ws_connection(state, socket))
}

/// Drive one client connection until it closes.
async fn handle_ws_connection(state: AppState, socket: WebSocket) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    let connection_id = Uuid::new_v4();
    let gateway = state.gateway;

    // Queue the greeting before registering so it is always the first frame out
    let _ = tx.send(connected_message(connection_id));
    gateway.connect(connection_id, tx);

    // Forward outbound frames to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => gateway.handle_frame(connection_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(connection = %connection_id, "Closing socket after read error: {e}");
                break;
            }
        }
    }

    send_task.abort();
    gateway.disconnect(connection_id).await;
}
