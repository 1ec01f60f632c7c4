use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

/// Secret used to sign admin session cookies outside production when none is configured.
const DEV_SESSION_SECRET: &str = "sudoku-relay-dev-session-secret";

/// Origins allowed by default: the public site and the local dev server.
const DEFAULT_CORS_ORIGINS: &str = "https://qdiag.xyz,http://localhost:8080";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub session_secret: String,
    /// Shared password that unlocks `/info`; login always fails when unset.
    pub admin_password: Option<String>,
    pub cors_origins: Vec<String>,
    pub max_rooms: usize,
    pub room_timeout_secs: u64,
    pub cleanup_interval_secs: u64,
    pub session_ttl_secs: u64,
}

/// Deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required in production: `SESSION_SECRET`.
    /// Optional with defaults: `SERVER_HOST`, `SERVER_PORT`, `ENVIRONMENT`, `LOG_LEVEL`,
    /// `ADMIN_PASSWORD`, `CORS_ORIGINS`, `MAX_ROOMS`, `ROOM_TIMEOUT_SECS`,
    /// `CLEANUP_INTERVAL_SECS`, `SESSION_TTL_SECS`.
    ///
    /// `PORT` overrides `SERVER_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `SESSION_SECRET` is missing in production, or if any numeric or
    /// address variable holds an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let environment = match std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };

        // PORT wins over SERVER_PORT, then 3000
        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let session_secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment == Environment::Production => {
                return Err(anyhow::anyhow!("SESSION_SECRET must be set in production"));
            }
            _ => DEV_SESSION_SECRET.to_string(),
        };

        let admin_password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|password| !password.is_empty());

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Ok(Self {
            server_host,
            server_port,
            environment,
            log_level,
            session_secret,
            admin_password,
            cors_origins,
            max_rooms: env_or("MAX_ROOMS", 1000)?,
            room_timeout_secs: env_or("ROOM_TIMEOUT_SECS", 7 * 24 * 60 * 60)?,
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", 60)?,
            session_ttl_secs: env_or("SESSION_TTL_SECS", 24 * 60 * 60)?,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Idle time after which an empty room is reaped.
    #[must_use]
    pub fn room_timeout(&self) -> TimeDelta {
        i64::try_from(self.room_timeout_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Period of the idle-room sweep.
    #[must_use]
    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn env_or<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
