use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    // Read for deployment parity; no auth middleware consumes it yet.
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Per-request deadline enforced at the router.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long a request may wait for a pool slot before failing with a
    /// timeout.
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            server: ServerConfig {
                port: parse_env("PORT", 8080),
                request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 15)),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:todo_api.db?mode=rwc".to_string()),
                max_connections: parse_env("DB_MAX_CONNECTIONS", 5),
                acquire_timeout: Duration::from_secs(parse_env("DB_ACQUIRE_TIMEOUT_SECS", 5)),
            },
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "your-secret-key".to_string()),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    parse_or(env::var(key).ok(), default)
}

/// Parses at the target type, so a value out of range for it (e.g. a
/// port above 65535) falls back to the default exactly like garbage
/// input does, instead of being truncated.
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}
