//! Sudoku session document, incremental updates, and their validation.

pub mod state;
pub mod update;
pub mod validator;

pub use state::{Board, FixedGrid, GameState, PencilMarks, Snapshot, GRID_SIZE, NO_PUZZLE_INDEX};
pub use update::{LoadCode, NewGame, Update};
pub use validator::{validate_game_state, validate_update};
