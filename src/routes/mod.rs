mod auth;
mod health;
pub mod socket;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`, `GET /stats`, `GET /room/{code}/exists`: public status
/// - `GET /info`: room dump, admin session required
/// - `/auth/login`, `/auth/logout`, `/auth/status`: admin session lifecycle
/// - `GET /ws`: gateway `WebSocket`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .merge(socket::router())
}
