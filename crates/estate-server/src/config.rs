//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Attempts to open the database before giving up at start-up
    pub database_connect_attempts: u32,
    pub database_backoff_min: Duration,
    pub database_backoff_max: Duration,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("ESTATE_PORT", 1323),
            database_path: env::var("ESTATE_DATABASE_PATH")
                .unwrap_or_else(|_| "data/estate.db".to_string()),
            database_max_connections: env_or("ESTATE_DB_MAX_CONNECTIONS", 5),
            database_connect_attempts: env_or("ESTATE_DB_CONNECT_ATTEMPTS", 5),
            database_backoff_min: Duration::from_millis(env_or("ESTATE_DB_BACKOFF_MIN_MS", 100)),
            database_backoff_max: Duration::from_millis(env_or("ESTATE_DB_BACKOFF_MAX_MS", 1_000)),
            log_json: env::var("ESTATE_LOG_JSON")
                .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
