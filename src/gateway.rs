//! Session gateway: connection ↔ room wiring and the validate → apply → broadcast pipeline.
//!
//! Each operation holds the room-store lock for its whole duration, including queuing its
//! outbound frames. Messages are therefore applied and relayed one at a time, in arrival
//! order, and no frame is ever sent for an update that was not applied.
//!
//! Room membership is the only access control: any connection that knows a code may join
//! and edit that room.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use crate::connections::{ConnectionHub, WsTx};
use crate::game::{GameState, Snapshot, Update, validate_game_state, validate_update};
use crate::protocol::{
    ClientFrame, GameUpdatePayload, Reply, ack_message, game_update_message, player_count_message,
};
use crate::rooms::{PlayerId, RoomError, RoomStore};
use crate::utils::normalize_room_code;

const ROOM_LIMIT_MESSAGE: &str = "Server room limit reached. Please try again later.";
const INVALID_STATE_MESSAGE: &str = "Invalid game state";

/// Shared handle to the room store and the live connections.
#[derive(Debug, Clone)]
pub struct Gateway {
    rooms: Arc<Mutex<RoomStore>>,
    hub: ConnectionHub,
}

impl Gateway {
    #[must_use]
    pub fn new(store: RoomStore) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(store)),
            hub: ConnectionHub::new(),
        }
    }

    /// Lock the room store for read-only queries (stats, health, info).
    pub async fn store(&self) -> MutexGuard<'_, RoomStore> {
        self.rooms.lock().await
    }

    #[must_use]
    pub const fn hub(&self) -> &ConnectionHub {
        &self.hub
    }

    /// Start tracking a freshly upgraded connection.
    pub fn connect(&self, player: PlayerId, tx: WsTx) {
        self.hub.register(player, tx);
        tracing::info!(connection = %player, "User connected");
    }

    /// Dispatch one inbound text frame.
    pub async fn handle_frame(&self, player: PlayerId, text: &str) {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(connection = %player, "Ignoring malformed frame: {e}");
                return;
            }
        };

        match frame.kind.as_str() {
            "create-room" => {
                self.create_room(player, frame.request_id, frame.payload)
                    .await;
            }
            "join-room" => {
                let code = room_code_of(&frame.payload);
                self.join_room(player, frame.request_id, &code).await;
            }
            "leave-room" => {
                let code = room_code_of(&frame.payload);
                self.leave_room(player, frame.request_id, &code).await;
            }
            "game-update" => match serde_json::from_value::<GameUpdatePayload>(frame.payload) {
                Ok(GameUpdatePayload { room_code, update }) => {
                    if let Err(e) = self.game_update(player, &room_code, update).await {
                        tracing::warn!(connection = %player, room = %room_code, "Dropped game update: {e}");
                    }
                }
                Err(e) => {
                    tracing::warn!(connection = %player, "Dropped malformed game update: {e}");
                }
            },
            other => {
                tracing::debug!(connection = %player, kind = other, "Ignoring unknown frame type");
            }
        }
    }

    /// Create a room from `snapshot`, join the caller to it, and answer with the code.
    pub async fn create_room(
        &self,
        player: PlayerId,
        request_id: Option<u64>,
        snapshot: Value,
    ) -> Reply {
        let mut store = self.rooms.lock().await;

        let reply = match self.try_create_room(&mut store, player, snapshot) {
            Ok(code) => {
                tracing::info!(room = %code, connection = %player, "Room created");
                Reply::Created { room_code: code }
            }
            Err(reply) => reply,
        };

        self.reply(player, request_id, &reply);
        reply
    }

    fn try_create_room(
        &self,
        store: &mut RoomStore,
        player: PlayerId,
        snapshot: Value,
    ) -> Result<String, Reply> {
        if store.is_full() {
            tracing::warn!(connection = %player, "Room limit reached, refusing to create room");
            return Err(Reply::Error(ROOM_LIMIT_MESSAGE.to_string()));
        }
        if !validate_game_state(&snapshot) {
            tracing::warn!(connection = %player, "Rejected invalid game state");
            return Err(Reply::Error(INVALID_STATE_MESSAGE.to_string()));
        }

        let snapshot: Snapshot = serde_json::from_value(snapshot).map_err(|e| {
            tracing::warn!(connection = %player, "Game state does not fit the model: {e}");
            Reply::Error(INVALID_STATE_MESSAGE.to_string())
        })?;

        let code = store
            .create_room(GameState::from(snapshot))
            .map_err(|e| room_error_reply(&e))?;
        store
            .add_player(&code, player)
            .map_err(|e| room_error_reply(&e))?;

        self.broadcast_player_count(store, &code);
        Ok(code)
    }

    /// Join the caller to an existing room and answer with its current snapshot.
    pub async fn join_room(&self, player: PlayerId, request_id: Option<u64>, code: &str) -> Reply {
        let mut store = self.rooms.lock().await;

        let Some(game_state) = store.get_room(code).map(|room| room.game_state.clone()) else {
            let reply = room_error_reply(&RoomError::NotFound);
            self.reply(player, request_id, &reply);
            return reply;
        };

        if let Err(e) = store.add_player(code, player) {
            let reply = room_error_reply(&e);
            self.reply(player, request_id, &reply);
            return reply;
        }

        let reply = Reply::Joined {
            game_state: Box::new(game_state),
        };
        self.reply(player, request_id, &reply);
        self.broadcast_player_count(&store, code);

        tracing::info!(room = %code, connection = %player, "User joined room");
        reply
    }

    /// Remove the caller from a room. Leaving a room one is not in is not an error.
    pub async fn leave_room(&self, player: PlayerId, request_id: Option<u64>, code: &str) -> Reply {
        let mut store = self.rooms.lock().await;

        store.remove_player(code, player);
        self.broadcast_player_count(&store, code);

        let reply = Reply::Left;
        self.reply(player, request_id, &reply);

        tracing::info!(room = %code, connection = %player, "User left room");
        reply
    }

    /// Validate and apply an update envelope, then relay it verbatim to the other members.
    ///
    /// Fire-and-forget: the sender never hears about a rejection.
    ///
    /// # Errors
    ///
    /// Returns the reason the envelope was dropped: [`RoomError::NotFound`] for an unknown
    /// room, [`RoomError::InvalidUpdate`] when validation fails, or whatever the store
    /// reports while applying it.
    pub async fn game_update(
        &self,
        player: PlayerId,
        code: &str,
        envelope: Value,
    ) -> Result<(), RoomError> {
        let mut store = self.rooms.lock().await;

        if store.get_room(code).is_none() {
            return Err(RoomError::NotFound);
        }
        if !validate_update(&envelope) {
            return Err(RoomError::InvalidUpdate("rejected by validator".to_string()));
        }

        let update = Update::try_from(envelope.clone())?;
        let kind = update.kind();
        store.update_game_state(code, update)?;

        let members = store.players(code);
        self.hub
            .send_to_others(&members, player, &game_update_message(&envelope));

        tracing::debug!(room = %code, connection = %player, kind, "Applied game update");
        Ok(())
    }

    /// Drop the connection from every room it joined and tell the remaining members.
    pub async fn disconnect(&self, player: PlayerId) {
        let mut store = self.rooms.lock().await;

        for code in store.player_rooms(player) {
            store.remove_player(&code, player);
            self.broadcast_player_count(&store, &code);
        }
        self.hub.unregister(player);

        tracing::info!(connection = %player, "User disconnected");
    }

    /// Remove empty rooms idle past the timeout. Returns how many were removed.
    pub async fn cleanup_empty_rooms(&self) -> usize {
        self.rooms.lock().await.cleanup_empty_rooms()
    }

    fn broadcast_player_count(&self, store: &RoomStore, code: &str) {
        let message = player_count_message(store.player_count(code));
        self.hub.send_to_all(&store.players(code), &message);
    }

    fn reply(&self, player: PlayerId, request_id: Option<u64>, reply: &Reply) {
        if let Some(request_id) = request_id {
            self.hub.send_to(player, &ack_message(request_id, reply));
        }
    }
}

/// Room code carried by a `join-room` / `leave-room` payload.
fn room_code_of(payload: &Value) -> String {
    payload
        .as_str()
        .map(normalize_room_code)
        .unwrap_or_default()
}

fn room_error_reply(error: &RoomError) -> Reply {
    match error {
        RoomError::RoomLimitReached => Reply::Error(ROOM_LIMIT_MESSAGE.to_string()),
        other => Reply::Error(other.to_string()),
    }
}
