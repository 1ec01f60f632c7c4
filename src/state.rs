use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AdminCredentials, AdminSessions};
use crate::config::Config;
use crate::gateway::Gateway;
use crate::rooms::RoomStore;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: Gateway,
    pub admin_credentials: Arc<AdminCredentials>,
    pub admin_sessions: AdminSessions,
    pub started_at: Instant,
}

impl AppState {
    /// Build the state for `config`, with an empty room store sized from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin password cannot be hashed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = RoomStore::new(config.max_rooms, config.room_timeout());
        let admin_credentials = AdminCredentials::from_password(config.admin_password.as_deref())?;
        let admin_sessions = AdminSessions::new(
            &config.session_secret,
            config.session_ttl_secs,
            config.is_production(),
        );

        Ok(Self {
            config,
            gateway: Gateway::new(store),
            admin_credentials: Arc::new(admin_credentials),
            admin_sessions,
            started_at: Instant::now(),
        })
    }
}
