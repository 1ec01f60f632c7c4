use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::AdminSession;
use crate::rooms::DetailedInfo;
use crate::state::AppState;
use crate::utils::{is_valid_room_code, normalize_room_code};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    rooms: usize,
    /// Open gateway sockets
    connections: usize,
    /// Process uptime in seconds
    uptime: f64,
}

#[derive(Serialize)]
struct StatsResponse {
    rooms: usize,
    players: usize,
}

#[derive(Serialize)]
struct ExistsResponse {
    exists: bool,
}

/// Public status routes plus the session-gated `/info` dump.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .route("/room/{code}/exists", get(room_exists))
        .route("/info", get(info))
}

/// `GET /health`: liveness with room and connection counts and uptime.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let rooms = state.gateway.store().await.room_count();

    Json(HealthResponse {
        status: "ok",
        rooms,
        connections: state.gateway.hub().connection_count(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

/// `GET /stats`: public room and player counts.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.gateway.store().await;

    Json(StatsResponse {
        rooms: store.room_count(),
        players: store.total_players(),
    })
}

/// `GET /room/{code}/exists`: whether a room code is live.
async fn room_exists(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<ExistsResponse> {
    let code = normalize_room_code(&code);
    let exists = is_valid_room_code(&code) && state.gateway.store().await.room_exists(&code);

    Json(ExistsResponse { exists })
}

/// `GET /info`: full room dump, admin session required.
async fn info(State(state): State<AppState>, _session: AdminSession) -> Json<DetailedInfo> {
    Json(state.gateway.store().await.detailed_info())
}
