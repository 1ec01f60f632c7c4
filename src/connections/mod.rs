//! In-memory registry of live `WebSocket` connections.
//!
//! Maps each connection id to the channel feeding its socket writer. Room membership is
//! not tracked here: the room store owns it, and the gateway asks the store who to send to.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::rooms::PlayerId;

/// Outbound text frames destined for one `WebSocket` client.
pub type WsTx = mpsc::UnboundedSender<String>;

/// Tracks the outbound channel of every connected client.
#[derive(Debug, Clone, Default)]
pub struct ConnectionHub {
    connections: Arc<DashMap<PlayerId, WsTx>>,
}

impl ConnectionHub {
    /// Create a new empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Register a client connection.
    pub fn register(&self, player: PlayerId, tx: WsTx) {
        self.connections.insert(player, tx);
    }

    /// Unregister a client connection.
    pub fn unregister(&self, player: PlayerId) {
        self.connections.remove(&player);
    }

    /// Send a message to one client. Closed or unknown connections are skipped.
    pub fn send_to(&self, player: PlayerId, message: &str) {
        if let Some(tx) = self.connections.get(&player) {
            let _ = tx.send(message.to_string());
        }
    }

    /// Send a message to every listed client.
    pub fn send_to_all(&self, players: &[PlayerId], message: &str) {
        for player in players {
            self.send_to(*player, message);
        }
    }

    /// Send a message to every listed client except `sender`.
    pub fn send_to_others(&self, players: &[PlayerId], sender: PlayerId, message: &str) {
        for player in players.iter().filter(|player| **player != sender) {
            self.send_to(*player, message);
        }
    }

    /// Number of live connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
