//! Server-side admin sessions carried in a signed cookie.
//!
//! The cookie holds an HS256 token whose `jti` names a live session. A token is only
//! accepted while its session id is still present in the server-side map, so logout
//! takes effect immediately even though the token itself has not expired.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::Utc;
use dashmap::DashMap;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "sudoku.sid";

const SESSION_SUBJECT: &str = "admin";

/// Claims embedded in the session cookie.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Always `"admin"`.
    pub sub: String,
    /// Session id, the key of the server-side record.
    pub jti: String,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Live admin sessions, keyed by session id with their expiry timestamp.
#[derive(Debug, Clone)]
pub struct AdminSessions {
    live: Arc<DashMap<Uuid, i64>>,
    secret: Arc<str>,
    ttl_secs: i64,
    secure_cookie: bool,
}

impl AdminSessions {
    /// Create an empty session table.
    ///
    /// `secure_cookie` adds the `Secure` attribute, which browsers only honor over HTTPS.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64, secure_cookie: bool) -> Self {
        Self {
            live: Arc::new(DashMap::new()),
            secret: Arc::from(secret),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            secure_cookie,
        }
    }

    /// Start a session and return the signed token for its cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn issue(&self) -> anyhow::Result<String> {
        let now = Utc::now().timestamp();
        let session_id = Uuid::new_v4();
        let claims = SessionClaims {
            sub: SESSION_SUBJECT.to_string(),
            jti: session_id.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        let token = encode(&Header::default(), &claims, &key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {e}"))?;

        self.live.insert(session_id, claims.exp);
        Ok(token)
    }

    /// Resolve a cookie token to its live session id.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<Uuid> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let claims = decode::<SessionClaims>(token, &key, &Validation::default())
            .map_err(|e| tracing::debug!("Rejected session token: {e}"))
            .ok()?
            .claims;

        if claims.sub != SESSION_SUBJECT {
            return None;
        }
        let session_id: Uuid = claims.jti.parse().ok()?;
        let expires_at = *self.live.get(&session_id)?;
        (expires_at > Utc::now().timestamp()).then_some(session_id)
    }

    /// End the session behind `token`. Returns `false` if it was not live.
    pub fn revoke(&self, token: &str) -> bool {
        self.validate(token)
            .is_some_and(|session_id| self.live.remove(&session_id).is_some())
    }

    /// Drop expired sessions. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.live.len();
        self.live.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.live.len())
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    #[must_use]
    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.ttl_secs)
    }

    /// `Set-Cookie` value that makes the browser forget the session.
    #[must_use]
    pub fn cleared_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let secure = if self.secure_cookie { "; Secure" } else { "" };
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
    }
}

/// Extract the session token from the request's `Cookie` headers.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}
