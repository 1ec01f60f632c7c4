use serde::Deserialize;
use serde_json::{Map, Value};

use super::state::{Board, FixedGrid, PencilMarks};
use crate::rooms::RoomError;

/// Update kinds the room store knows how to apply.
pub const UPDATE_KINDS: &[&str] = &[
    "board",
    "cell",
    "pencilMarks",
    "pencilMark",
    "markedCells",
    "undo",
    "undoHistory",
    "settings",
    "new-game",
    "load-code",
];

/// Incremental state update, decoded from a `{type, data}` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Update {
    #[serde(rename = "board")]
    Board { board: Board },
    #[serde(rename = "cell")]
    Cell { row: usize, col: usize, value: u8 },
    #[serde(rename = "pencilMarks", rename_all = "camelCase")]
    PencilMarks { pencil_marks: PencilMarks },
    #[serde(rename = "pencilMark")]
    PencilMark {
        row: usize,
        col: usize,
        marks: Vec<u8>,
    },
    #[serde(rename = "markedCells", rename_all = "camelCase")]
    MarkedCells { marked_cells: Vec<Value> },
    /// Pop one undo level: board, marks and marked cells are replaced together.
    #[serde(rename = "undo", rename_all = "camelCase")]
    Undo {
        board: Board,
        pencil_marks: PencilMarks,
        #[serde(default)]
        marked_cells: Option<Vec<Value>>,
    },
    #[serde(rename = "undoHistory", rename_all = "camelCase")]
    UndoHistory { undo_history: Vec<Value> },
    #[serde(rename = "settings")]
    Settings(Map<String, Value>),
    #[serde(rename = "new-game")]
    NewGame(NewGame),
    #[serde(rename = "load-code")]
    LoadCode(LoadCode),
}

/// A fresh puzzle picked from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub board: Board,
    pub initial_board: Board,
    pub fixed: FixedGrid,
    pub current_puzzle_index: i64,
    #[serde(default)]
    pub pencil_marks: Option<PencilMarks>,
}

/// A puzzle imported from an 81-digit share code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCode {
    pub board: Board,
    pub initial_board: Board,
    pub fixed: FixedGrid,
    pub code: String,
    #[serde(default)]
    pub current_puzzle_index: Option<i64>,
    #[serde(default)]
    pub pencil_marks: Option<PencilMarks>,
}

impl Update {
    /// Wire name of this update kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Board { .. } => "board",
            Self::Cell { .. } => "cell",
            Self::PencilMarks { .. } => "pencilMarks",
            Self::PencilMark { .. } => "pencilMark",
            Self::MarkedCells { .. } => "markedCells",
            Self::Undo { .. } => "undo",
            Self::UndoHistory { .. } => "undoHistory",
            Self::Settings(_) => "settings",
            Self::NewGame(_) => "new-game",
            Self::LoadCode(_) => "load-code",
        }
    }
}

impl TryFrom<Value> for Update {
    type Error = RoomError;

    /// Decode an envelope. Run [`super::validate_update`] first; this only reports
    /// unknown kinds and payloads that do not fit the typed model.
    fn try_from(envelope: Value) -> Result<Self, Self::Error> {
        let kind = envelope
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !UPDATE_KINDS.contains(&kind.as_str()) {
            return Err(RoomError::UnknownUpdateType(kind));
        }

        serde_json::from_value(envelope).map_err(|e| RoomError::InvalidUpdate(format!("{kind}: {e}")))
    }
}
