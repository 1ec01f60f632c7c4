//! Shape and bounds checks for untrusted snapshots and update envelopes.
//!
//! These are the only trust boundary of the server: the room store indexes into
//! grids without re-checking, so every field it reads must be covered here.
//! Both entry points return `false` instead of failing and never mutate their input.

use serde_json::{Map, Value};

use super::state::GRID_SIZE;

const MAX_DIGIT: u64 = 9;
const MAX_INDEX: u64 = 8;
const SHARE_CODE_LENGTH: usize = 81;

/// Accept a full snapshot suitable for `create-room`.
#[must_use]
pub fn validate_game_state(value: &Value) -> bool {
    let Some(state) = value.as_object() else {
        return false;
    };

    for field in ["board", "pencilMarks", "initialBoard"] {
        if !state.contains_key(field) {
            tracing::debug!(field, "Snapshot is missing a required field");
            return false;
        }
    }

    is_board(&state["board"])
        && is_board(&state["initialBoard"])
        && is_pencil_marks(&state["pencilMarks"])
        && optional(state, "markedCells", Value::is_array)
        && optional(state, "undoHistory", Value::is_array)
        && optional(state, "currentPuzzleIndex", Value::is_i64)
        && optional(state, "prefillNotes", Value::is_boolean)
        && optional(state, "autoClearNotes", Value::is_boolean)
        && optional(state, "multicolorBrush", Value::is_boolean)
        && optional(state, "fixed", is_fixed_grid)
}

/// Accept an incremental `{type, data}` envelope.
#[must_use]
pub fn validate_update(envelope: &Value) -> bool {
    let Some(kind) = envelope
        .get("type")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
    else {
        return false;
    };
    let Some(data) = envelope.get("data").and_then(Value::as_object) else {
        return false;
    };

    match kind {
        "board" => data.get("board").is_some_and(is_board),
        "cell" => {
            is_index(data.get("row"))
                && is_index(data.get("col"))
                && data.get("value").is_some_and(|v| is_digit_in(v, 0))
        }
        "pencilMarks" => data.get("pencilMarks").is_some_and(is_pencil_marks),
        "pencilMark" => {
            is_index(data.get("row"))
                && is_index(data.get("col"))
                && data.get("marks").is_some_and(is_mark_list)
        }
        "markedCells" => data.get("markedCells").is_some_and(Value::is_array),
        "undo" => {
            data.get("board").is_some_and(is_board)
                && data.get("pencilMarks").is_some_and(is_pencil_marks)
                && optional(data, "markedCells", Value::is_array)
        }
        "undoHistory" => data.get("undoHistory").is_some_and(Value::is_array),
        "settings" => true,
        "new-game" => validate_puzzle_load(kind, data, &["currentPuzzleIndex"]),
        "load-code" => {
            validate_puzzle_load(kind, data, &["code"])
                && data.get("code").is_some_and(is_share_code)
                && optional(data, "currentPuzzleIndex", Value::is_i64)
        }
        _ => false,
    }
}

/// Checks shared by `new-game` and `load-code`.
fn validate_puzzle_load(kind: &str, data: &Map<String, Value>, extra_required: &[&str]) -> bool {
    for field in ["board", "initialBoard", "fixed"].iter().chain(extra_required) {
        if !data.contains_key(*field) {
            tracing::debug!(kind, field = *field, "Puzzle update is missing a required field");
            return false;
        }
    }

    is_board(&data["board"])
        && is_board(&data["initialBoard"])
        && is_fixed_grid(&data["fixed"])
        && (kind != "new-game" || data["currentPuzzleIndex"].is_i64())
        && optional(data, "pencilMarks", is_pencil_marks)
}

/// `true` when `key` is absent, null, or satisfies `check`.
fn optional(object: &Map<String, Value>, key: &str, check: impl Fn(&Value) -> bool) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => true,
        Some(value) => check(value),
    }
}

fn is_grid(value: &Value, cell: impl Fn(&Value) -> bool) -> bool {
    value.as_array().is_some_and(|rows| {
        rows.len() == GRID_SIZE
            && rows.iter().all(|row| {
                row.as_array()
                    .is_some_and(|cells| cells.len() == GRID_SIZE && cells.iter().all(&cell))
            })
    })
}

fn is_board(value: &Value) -> bool {
    is_grid(value, |cell| is_digit_in(cell, 0))
}

fn is_pencil_marks(value: &Value) -> bool {
    is_grid(value, is_mark_list)
}

fn is_fixed_grid(value: &Value) -> bool {
    is_grid(value, Value::is_boolean)
}

fn is_mark_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|marks| marks.iter().all(|mark| is_digit_in(mark, 1)))
}

fn is_digit_in(value: &Value, min: u64) -> bool {
    value
        .as_u64()
        .is_some_and(|digit| (min..=MAX_DIGIT).contains(&digit))
}

fn is_index(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_u64)
        .is_some_and(|index| index <= MAX_INDEX)
}

fn is_share_code(value: &Value) -> bool {
    value.as_str().is_some_and(|code| {
        code.len() == SHARE_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
    })
}
