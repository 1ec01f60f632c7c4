//! Sudoku Relay - room server for collaborative Sudoku
//!
//! This crate lets several browsers share one Sudoku game:
//! - Rooms keyed by six-digit codes, each holding one authoritative game state
//! - A `WebSocket` gateway that validates, applies, and relays board updates
//! - Public health/stats endpoints and a password-gated room dump

pub mod app;
pub mod auth;
pub mod config;
pub mod connections;
pub mod error;
pub mod game;
pub mod gateway;
pub mod protocol;
pub mod reaper;
pub mod rooms;
pub mod routes;
pub mod state;
pub mod utils;
