//! In-memory room registry.
//!
//! [`RoomStore`] exclusively owns every room and the reverse index of which rooms each
//! connection has joined. It is a plain synchronous structure; the application state wraps
//! it in a single async mutex so each gateway message is applied to completion before the
//! next one touches any room.
//!
//! Calling convention: [`RoomStore::update_game_state`] trusts its input. Envelopes must
//! pass [`crate::game::validate_update`] before they are decoded and applied.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::game::state::empty_pencil_marks;
use crate::game::{GameState, NO_PUZZLE_INDEX, Update};
use crate::utils::random_room_code;

/// Identifies one live gateway connection.
pub type PlayerId = Uuid;

/// Default ceiling on concurrently live rooms.
pub const DEFAULT_MAX_ROOMS: usize = 1000;

/// Default idle time in seconds after which an empty room is reaped (7 days).
pub const DEFAULT_ROOM_TIMEOUT_SECS: i64 = 7 * 24 * 60 * 60;

/// Errors produced by room store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// The room ceiling has been reached
    RoomLimitReached,
    /// No live room has this code
    NotFound,
    /// Envelope did not fit the typed update model
    InvalidUpdate(String),
    /// Envelope named an update kind the store cannot apply
    UnknownUpdateType(String),
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomLimitReached => write!(f, "Server room limit reached"),
            Self::NotFound => write!(f, "Room not found"),
            Self::InvalidUpdate(msg) => write!(f, "Invalid update: {msg}"),
            Self::UnknownUpdateType(kind) => write!(f, "Unknown update type: {kind}"),
        }
    }
}

impl std::error::Error for RoomError {}

/// One shared puzzle session.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    pub game_state: GameState,
    pub players: HashSet<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Summary of a single room for the `/info` dump.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub code: String,
    pub players: usize,
    /// Unix timestamp in milliseconds
    pub created_at: i64,
    /// Unix timestamp in milliseconds
    pub last_activity: i64,
    pub age_minutes: i64,
    pub idle_minutes: i64,
    pub puzzle_index: i64,
}

/// Full registry dump returned by [`RoomStore::detailed_info`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedInfo {
    pub total_rooms: usize,
    pub total_players: usize,
    pub max_rooms: usize,
    pub room_timeout_minutes: i64,
    /// Newest room first.
    pub rooms: Vec<RoomSummary>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

/// Registry of live rooms plus the player → rooms reverse index.
#[derive(Debug)]
pub struct RoomStore {
    rooms: HashMap<String, Room>,
    player_rooms: HashMap<PlayerId, HashSet<String>>,
    max_rooms: usize,
    room_timeout: TimeDelta,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROOMS, TimeDelta::seconds(DEFAULT_ROOM_TIMEOUT_SECS))
    }
}

impl RoomStore {
    /// Create an empty store with the given room ceiling and idle timeout.
    #[must_use]
    pub fn new(max_rooms: usize, room_timeout: TimeDelta) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            max_rooms,
            room_timeout,
        }
    }

    /// `true` when no further room can be created.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.rooms.len() >= self.max_rooms
    }

    /// Generate a room code no live room is using, re-rolling on collision.
    #[must_use]
    pub fn generate_code(&self) -> String {
        loop {
            let code = random_room_code();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    /// Register a new room holding `initial_state` and return its code.
    ///
    /// The room starts with no players; joining is a separate step.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::RoomLimitReached`] when the store is at its ceiling.
    pub fn create_room(&mut self, initial_state: GameState) -> Result<String, RoomError> {
        if self.is_full() {
            return Err(RoomError::RoomLimitReached);
        }

        let code = self.generate_code();
        let now = Utc::now();
        self.rooms.insert(
            code.clone(),
            Room {
                code: code.clone(),
                game_state: initial_state,
                players: HashSet::new(),
                created_at: now,
                last_activity: now,
            },
        );

        Ok(code)
    }

    /// Look up a room, refreshing its activity timestamp on a hit.
    pub fn get_room(&mut self, code: &str) -> Option<&Room> {
        let room = self.rooms.get_mut(code)?;
        room.last_activity = Utc::now();
        Some(&*room)
    }

    #[must_use]
    pub fn room_exists(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Remove a room outright, dropping it from every member's reverse index.
    pub fn remove_room(&mut self, code: &str) -> Option<Room> {
        let room = self.rooms.remove(code)?;
        for player in &room.players {
            self.forget_membership(*player, code);
        }
        Some(room)
    }

    /// Join `player` to the room. A player may belong to several rooms at once.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NotFound`] if the room does not exist.
    pub fn add_player(&mut self, code: &str, player: PlayerId) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(code).ok_or(RoomError::NotFound)?;
        room.last_activity = Utc::now();
        room.players.insert(player);

        self.player_rooms
            .entry(player)
            .or_default()
            .insert(code.to_string());
        Ok(())
    }

    /// Remove `player` from the room. Unknown rooms and non-members are a no-op.
    pub fn remove_player(&mut self, code: &str, player: PlayerId) {
        let Some(room) = self.rooms.get_mut(code) else {
            return;
        };
        if room.players.remove(&player) {
            room.last_activity = Utc::now();
        }
        self.forget_membership(player, code);
    }

    fn forget_membership(&mut self, player: PlayerId, code: &str) {
        if let Some(codes) = self.player_rooms.get_mut(&player) {
            codes.remove(code);
            if codes.is_empty() {
                self.player_rooms.remove(&player);
            }
        }
    }

    /// Number of players in the room, `0` if it does not exist.
    #[must_use]
    pub fn player_count(&self, code: &str) -> usize {
        self.rooms.get(code).map_or(0, |room| room.players.len())
    }

    /// Members of the room, empty if it does not exist.
    #[must_use]
    pub fn players(&self, code: &str) -> Vec<PlayerId> {
        self.rooms
            .get(code)
            .map(|room| room.players.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Codes of every room `player` has joined.
    #[must_use]
    pub fn player_rooms(&self, player: PlayerId) -> Vec<String> {
        self.player_rooms
            .get(&player)
            .map(|codes| codes.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Apply an update to the room's authoritative state (last write wins).
    ///
    /// The update must come from an envelope that passed validation; cell coordinates are
    /// not range-checked beyond what safe indexing requires.
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::NotFound`] if the room does not exist, or
    /// [`RoomError::InvalidUpdate`] if a cell coordinate falls outside the grid.
    pub fn update_game_state(&mut self, code: &str, update: Update) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(code).ok_or(RoomError::NotFound)?;
        let state = &mut room.game_state;

        match update {
            Update::Board { board } => state.board = board,
            Update::Cell { row, col, value } => {
                let cell = state
                    .board
                    .get_mut(row)
                    .and_then(|cells| cells.get_mut(col))
                    .ok_or_else(|| RoomError::InvalidUpdate(format!("cell ({row}, {col})")))?;
                *cell = value;
            }
            Update::PencilMarks { pencil_marks } => state.pencil_marks = pencil_marks,
            Update::PencilMark { row, col, marks } => {
                let cell = state
                    .pencil_marks
                    .get_mut(row)
                    .and_then(|cells| cells.get_mut(col))
                    .ok_or_else(|| RoomError::InvalidUpdate(format!("cell ({row}, {col})")))?;
                *cell = marks;
            }
            Update::MarkedCells { marked_cells } => state.marked_cells = marked_cells,
            Update::Undo {
                board,
                pencil_marks,
                marked_cells,
            } => {
                state.board = board;
                state.pencil_marks = pencil_marks;
                state.marked_cells = marked_cells.unwrap_or_default();
            }
            Update::UndoHistory { undo_history } => state.undo_history = undo_history,
            Update::Settings(settings) => state.merge_settings(settings),
            Update::NewGame(game) => {
                state.board = game.board;
                state.initial_board = game.initial_board;
                state.fixed = game.fixed;
                state.current_puzzle_index = game.current_puzzle_index;
                reset_for_new_puzzle(state, game.pencil_marks);
            }
            Update::LoadCode(load) => {
                state.board = load.board;
                state.initial_board = load.initial_board;
                state.fixed = load.fixed;
                state.current_puzzle_index = load.current_puzzle_index.unwrap_or(NO_PUZZLE_INDEX);
                reset_for_new_puzzle(state, load.pencil_marks);
            }
        }

        room.last_activity = Utc::now();
        Ok(())
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Sum of player-set sizes across all rooms.
    #[must_use]
    pub fn total_players(&self) -> usize {
        self.rooms.values().map(|room| room.players.len()).sum()
    }

    /// Registry dump with per-room ages, newest room first.
    #[must_use]
    pub fn detailed_info(&self) -> DetailedInfo {
        let now = Utc::now();
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        DetailedInfo {
            total_rooms: self.rooms.len(),
            total_players: self.total_players(),
            max_rooms: self.max_rooms,
            room_timeout_minutes: self.room_timeout.num_minutes(),
            rooms: rooms
                .into_iter()
                .map(|room| RoomSummary {
                    code: room.code.clone(),
                    players: room.players.len(),
                    created_at: room.created_at.timestamp_millis(),
                    last_activity: room.last_activity.timestamp_millis(),
                    age_minutes: (now - room.created_at).num_minutes(),
                    idle_minutes: (now - room.last_activity).num_minutes(),
                    puzzle_index: room.game_state.current_puzzle_index,
                })
                .collect(),
            timestamp: now.timestamp_millis(),
        }
    }

    /// Remove every empty room idle for longer than the timeout. Returns how many went.
    pub fn cleanup_empty_rooms(&mut self) -> usize {
        self.cleanup_empty_rooms_at(Utc::now())
    }

    /// [`Self::cleanup_empty_rooms`] evaluated as if the clock read `now`.
    pub fn cleanup_empty_rooms_at(&mut self, now: DateTime<Utc>) -> usize {
        let timeout = self.room_timeout;
        let before = self.rooms.len();

        self.rooms.retain(|code, room| {
            let idle = now - room.last_activity;
            let expired = room.players.is_empty() && idle > timeout;
            if expired {
                tracing::info!(
                    room = %code,
                    idle_minutes = idle.num_minutes(),
                    "Cleaned up idle room"
                );
            }
            !expired
        });

        before - self.rooms.len()
    }
}

/// Shared tail of `new-game` and `load-code`: fresh marks, no highlights, no history.
fn reset_for_new_puzzle(state: &mut GameState, supplied_marks: Option<crate::game::PencilMarks>) {
    state.pencil_marks = match supplied_marks {
        Some(marks) if state.prefill_notes => marks,
        _ => empty_pencil_marks(),
    };
    state.marked_cells.clear();
    state.undo_history.clear();
}
