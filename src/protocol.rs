//! `WebSocket` wire format.
//!
//! Every frame is a JSON text message shaped `{ "type": ..., "payload": ... }`.
//! Requests that expect an answer carry a `requestId`; the server answers with an
//! `ack` frame echoing it. Requests without one get no answer.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::game::GameState;
use crate::rooms::PlayerId;

/// Inbound frame as sent by a client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub payload: Value,
}

/// Payload of a `game-update` frame.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdatePayload {
    pub room_code: String,
    /// The raw `{type, data}` envelope, relayed verbatim once applied.
    pub update: Value,
}

/// Answer to a request/response operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Created { room_code: String },
    Joined { game_state: Box<GameState> },
    Left,
    Error(String),
}

impl Reply {
    /// JSON body of the `ack` payload.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Created { room_code } => json!({ "success": true, "roomCode": room_code }),
            Self::Joined { game_state } => json!({ "success": true, "gameState": game_state }),
            Self::Left => json!({ "success": true }),
            Self::Error(message) => json!({ "error": message }),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// `ack` frame answering the request tagged `request_id`.
#[must_use]
pub fn ack_message(request_id: u64, reply: &Reply) -> String {
    json!({
        "type": "ack",
        "requestId": request_id,
        "payload": reply.to_json(),
    })
    .to_string()
}

/// Sent once right after the socket is upgraded.
#[must_use]
pub fn connected_message(connection_id: PlayerId) -> String {
    json!({
        "type": "connected",
        "payload": { "connectionId": connection_id },
    })
    .to_string()
}

/// Membership change notification.
#[must_use]
pub fn player_count_message(count: usize) -> String {
    json!({
        "type": "player-count",
        "payload": count,
    })
    .to_string()
}

/// Relay of an applied update envelope.
#[must_use]
pub fn game_update_message(update: &Value) -> String {
    json!({
        "type": "game-update",
        "payload": update,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_frame() {
        let frame: Result<ClientFrame, _> =
            serde_json::from_str(r#"{"type":"join-room","requestId":4,"payload":"482913"}"#);
        let frame = frame.ok();
        assert_eq!(frame.as_ref().map(|f| f.kind.as_str()), Some("join-room"));
        assert_eq!(frame.as_ref().and_then(|f| f.request_id), Some(4));
        assert_eq!(frame.map(|f| f.payload), Some(json!("482913")));
    }

    #[test]
    fn test_frame_without_request_id() {
        let frame: Result<ClientFrame, _> = serde_json::from_str(r#"{"type":"leave-room"}"#);
        let frame = frame.ok();
        assert_eq!(frame.as_ref().and_then(|f| f.request_id), None);
        assert_eq!(frame.map(|f| f.payload), Some(Value::Null));
    }

    #[test]
    fn test_ack_shapes() {
        let created: Value = serde_json::from_str(&ack_message(
            1,
            &Reply::Created {
                room_code: "012345".to_string(),
            },
        ))
        .unwrap_or_default();
        assert_eq!(created["type"], "ack");
        assert_eq!(created["requestId"], 1);
        assert_eq!(created["payload"]["success"], true);
        assert_eq!(created["payload"]["roomCode"], "012345");

        let failed = Reply::Error("Room not found".to_string());
        assert!(failed.is_error());
        assert_eq!(failed.to_json(), json!({ "error": "Room not found" }));
        assert_eq!(Reply::Left.to_json(), json!({ "success": true }));
    }

    #[test]
    fn test_broadcast_shapes() {
        let count: Value = serde_json::from_str(&player_count_message(2)).unwrap_or_default();
        assert_eq!(count, json!({ "type": "player-count", "payload": 2 }));

        let envelope = json!({ "type": "cell", "data": { "row": 0, "col": 0, "value": 7 } });
        let relay: Value =
            serde_json::from_str(&game_update_message(&envelope)).unwrap_or_default();
        assert_eq!(relay["type"], "game-update");
        assert_eq!(relay["payload"], envelope);
    }
}
