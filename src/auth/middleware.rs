use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::session::token_from_headers;
use crate::error::AppError;
use crate::state::AppState;

/// Live admin session resolved from the `sudoku.sid` cookie.
///
/// Use as an extractor to gate a handler behind `/auth/login`:
/// ```ignore
/// async fn handler(AdminSession(_): AdminSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AdminSession(pub Uuid);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers)
            .and_then(|token| state.admin_sessions.validate(token))
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
