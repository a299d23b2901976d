//! Configuration Module
//!
//! Loads server, database, cache and session settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// SQLite URL of the document store, e.g. `sqlite://blogo.db`
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Maximum number of entries the key-value cache can hold
    pub cache_max_entries: usize,
    /// How long a cached post listing stays valid, in seconds
    pub posts_cache_ttl: u64,
    /// How long a session lives after sign-in, in seconds
    pub session_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `DATABASE_URL` - Document store location (default: sqlite://blogo.db)
    /// - `DB_MAX_CONNECTIONS` - Connection pool size (default: 5)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `POSTS_CACHE_TTL` - Post listing TTL in seconds (default: 60)
    /// - `SESSION_TTL` - Session lifetime in seconds (default: 86400)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: http://localhost:3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_allowed_origins);

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.database_url);

        Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            database_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            posts_cache_ttl: parse_var("POSTS_CACHE_TTL", defaults.posts_cache_ttl),
            session_ttl: parse_var("SESSION_TTL", defaults.session_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL", defaults.cleanup_interval),
            cors_allowed_origins,
        }
    }

    pub fn posts_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.posts_cache_ttl)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            database_url: "sqlite://blogo.db".to_string(),
            db_max_connections: 5,
            cache_max_entries: 10_000,
            posts_cache_ttl: 60,
            session_ttl: 86_400,
            cleanup_interval: 1,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {key} value {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_url, "sqlite://blogo.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.posts_cache_ttl, 60);
        assert_eq!(config.session_ttl, 86_400);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("DB_MAX_CONNECTIONS");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("POSTS_CACHE_TTL");
        env::remove_var("SESSION_TTL");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("CORS_ALLOWED_ORIGINS");

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.database_url, "sqlite://blogo.db");
        assert_eq!(config.posts_cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.session_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" http://a.test, ,http://b.test ");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("BLOGO_TEST_PORT", "not-a-port");
        let port: u16 = parse_var("BLOGO_TEST_PORT", 9000);
        assert_eq!(port, 9000);
        env::remove_var("BLOGO_TEST_PORT");
    }
}
