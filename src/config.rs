//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Which cache backend the service should run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
    None,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database location (`:memory:` allowed)
    pub database_url: String,
    /// Redis connection string
    pub redis_url: String,
    /// Cache backend selection
    pub cache_backend: CacheBackendKind,
    /// Default TTL in seconds for cached items
    pub cache_ttl: u64,
    /// Capacity of the in-process memory backend
    pub cache_max_entries: usize,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` - SQLite path, optional `sqlite://` prefix (default: items.db)
    /// - `REDIS_URL` - Redis URL (default: redis://localhost:6379/0)
    /// - `CACHE_BACKEND` - redis, memory or none (default: redis)
    /// - `CACHE_TTL` - Default cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Memory backend capacity (default: 10000)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep frequency in seconds (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.cache_backend),
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES")
                .unwrap_or(defaults.cache_max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Database path with any `sqlite://` scheme stripped.
    pub fn database_path(&self) -> &str {
        self.database_url
            .strip_prefix("sqlite://")
            .unwrap_or(&self.database_url)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "items.db".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            cache_backend: CacheBackendKind::Redis,
            cache_ttl: 300,
            cache_max_entries: 10_000,
            cleanup_interval: 1,
            server_port: 8000,
        }
    }
}
