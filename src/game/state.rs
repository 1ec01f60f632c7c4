use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Side length of a Sudoku grid.
pub const GRID_SIZE: usize = 9;

/// A square 9×9 grid of cells.
pub type Grid<T> = [[T; GRID_SIZE]; GRID_SIZE];

/// Board digits, `0` meaning an empty cell.
pub type Board = Grid<u8>;

/// Per-cell pencil marks (candidate digits 1–9).
pub type PencilMarks = Grid<Vec<u8>>;

/// Cells given by the puzzle, which players must not edit.
pub type FixedGrid = Grid<bool>;

/// Puzzle index used when a game was not loaded from the catalog.
pub const NO_PUZZLE_INDEX: i64 = -1;

/// Top-level keys of [`GameState`] that a `settings` update is never allowed to overwrite.
pub const STRUCTURAL_FIELDS: &[&str] = &[
    "board",
    "pencilMarks",
    "markedCells",
    "undoHistory",
    "initialBoard",
    "currentPuzzleIndex",
    "fixed",
];

/// Authoritative puzzle document held by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub board: Board,
    pub pencil_marks: PencilMarks,
    /// Highlighted cells; the element shape belongs to the client.
    pub marked_cells: Vec<Value>,
    /// Prior `{board, pencilMarks, markedCells}` snapshots, newest last.
    pub undo_history: Vec<Value>,
    pub initial_board: Board,
    pub current_puzzle_index: i64,
    pub prefill_notes: bool,
    pub auto_clear_notes: bool,
    pub multicolor_brush: bool,
    pub fixed: FixedGrid,
    /// Settings flags this server has no dedicated field for.
    #[serde(flatten)]
    pub extra_settings: Map<String, Value>,
}

/// Full game-state snapshot as sent by `create-room`.
///
/// Only the three grids are required; everything else falls back to a safe default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub board: Board,
    pub pencil_marks: PencilMarks,
    pub initial_board: Board,
    #[serde(default)]
    pub marked_cells: Option<Vec<Value>>,
    #[serde(default)]
    pub undo_history: Option<Vec<Value>>,
    #[serde(default)]
    pub current_puzzle_index: Option<i64>,
    #[serde(default)]
    pub prefill_notes: Option<bool>,
    #[serde(default)]
    pub auto_clear_notes: Option<bool>,
    #[serde(default)]
    pub multicolor_brush: Option<bool>,
    #[serde(default)]
    pub fixed: Option<FixedGrid>,
}

impl From<Snapshot> for GameState {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            board: snapshot.board,
            pencil_marks: snapshot.pencil_marks,
            marked_cells: snapshot.marked_cells.unwrap_or_default(),
            undo_history: snapshot.undo_history.unwrap_or_default(),
            initial_board: snapshot.initial_board,
            current_puzzle_index: snapshot.current_puzzle_index.unwrap_or(NO_PUZZLE_INDEX),
            prefill_notes: snapshot.prefill_notes.unwrap_or(false),
            auto_clear_notes: snapshot.auto_clear_notes.unwrap_or(false),
            multicolor_brush: snapshot.multicolor_brush.unwrap_or(false),
            fixed: snapshot.fixed.unwrap_or_default(),
            extra_settings: Map::new(),
        }
    }
}

impl GameState {
    /// Shallow-merge a `settings` payload.
    ///
    /// Known flags are only taken when boolean. Unknown keys are kept verbatim so new
    /// client flags pass through; keys naming a grid or other structural field are dropped.
    pub fn merge_settings(&mut self, settings: Map<String, Value>) {
        for (key, value) in settings {
            match key.as_str() {
                "prefillNotes" => merge_flag(&mut self.prefill_notes, &key, &value),
                "autoClearNotes" => merge_flag(&mut self.auto_clear_notes, &key, &value),
                "multicolorBrush" => merge_flag(&mut self.multicolor_brush, &key, &value),
                name if STRUCTURAL_FIELDS.contains(&name) => {
                    tracing::debug!(setting = %key, "Ignoring settings key that names a state field");
                }
                _ => {
                    self.extra_settings.insert(key, value);
                }
            }
        }
    }
}

fn merge_flag(flag: &mut bool, key: &str, value: &Value) {
    match value.as_bool() {
        Some(enabled) => *flag = enabled,
        None => tracing::debug!(setting = %key, "Ignoring non-boolean value for settings flag"),
    }
}

/// An all-empty pencil-mark grid.
#[must_use]
pub fn empty_pencil_marks() -> PencilMarks {
    PencilMarks::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: Value) -> Snapshot {
        serde_json::from_value(value).unwrap_or_else(|e| unreachable!("bad fixture: {e}"))
    }

    fn minimal() -> Value {
        json!({
            "board": vec![vec![0; 9]; 9],
            "initialBoard": vec![vec![0; 9]; 9],
            "pencilMarks": vec![vec![Vec::<u8>::new(); 9]; 9],
        })
    }

    #[test]
    fn test_snapshot_defaults() {
        let state = GameState::from(snapshot(minimal()));
        assert!(state.marked_cells.is_empty());
        assert!(state.undo_history.is_empty());
        assert_eq!(state.current_puzzle_index, NO_PUZZLE_INDEX);
        assert!(!state.prefill_notes);
        assert!(!state.auto_clear_notes);
        assert!(!state.multicolor_brush);
        assert_eq!(state.fixed, FixedGrid::default());
    }

    #[test]
    fn test_snapshot_keeps_puzzle_index_zero() {
        let mut value = minimal();
        value["currentPuzzleIndex"] = json!(0);
        let state = GameState::from(snapshot(value));
        assert_eq!(state.current_puzzle_index, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let state = GameState::from(snapshot(minimal()));
        let value = serde_json::to_value(&state).unwrap_or_default();
        assert!(value.get("pencilMarks").is_some());
        assert!(value.get("initialBoard").is_some());
        assert_eq!(value["currentPuzzleIndex"], -1);
        assert_eq!(value["prefillNotes"], false);
    }

    #[test]
    fn test_merge_settings() {
        let mut state = GameState::from(snapshot(minimal()));
        let settings = json!({
            "prefillNotes": true,
            "multicolorBrush": "yes",
            "highlightPeers": true,
            "board": "garbage",
        });
        let Value::Object(map) = settings else {
            unreachable!()
        };
        state.merge_settings(map);

        assert!(state.prefill_notes);
        assert!(!state.multicolor_brush);
        assert_eq!(state.extra_settings.get("highlightPeers"), Some(&json!(true)));
        assert!(!state.extra_settings.contains_key("board"));
        assert_eq!(state.board, Board::default());

        let value = serde_json::to_value(&state).unwrap_or_default();
        assert_eq!(value["highlightPeers"], true);
    }
}
