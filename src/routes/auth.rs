use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::session::token_from_headers;
use crate::error::AppError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/status", get(status))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct StatusResponse {
    authenticated: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /auth/login`: Start an admin session when the shared password matches.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.admin_credentials.verify(&body.password) {
        tracing::warn!("Rejected admin login");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let token = state.admin_sessions.issue()?;
    tracing::info!("Admin session started");

    Ok((
        AppendHeaders([(SET_COOKIE, state.admin_sessions.session_cookie(&token))]),
        Json(SuccessResponse { success: true }),
    ))
}

/// `POST /auth/logout`: End the caller's admin session, if any.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        state.admin_sessions.revoke(token);
    }

    (
        AppendHeaders([(SET_COOKIE, state.admin_sessions.cleared_cookie())]),
        Json(SuccessResponse { success: true }),
    )
}

/// `GET /auth/status`: Whether the caller holds a live admin session.
async fn status(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusResponse> {
    let authenticated = token_from_headers(&headers)
        .and_then(|token| state.admin_sessions.validate(token))
        .is_some();

    Json(StatusResponse { authenticated })
}
