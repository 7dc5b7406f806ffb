//! Configuration Module
//!
//! Handles loading service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::MemoOptions;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Path of the JSON file backing persistent storage
    pub storage_path: String,
    /// Namespace prepended to every persisted key
    pub storage_prefix: String,
    /// Byte budget of the storage medium
    pub storage_quota_bytes: usize,
    /// Lifetime of the persisted name list, in hours
    pub names_ttl_hours: f64,
    /// Maximum entries in the name query cache
    pub query_cache_limit: usize,
    /// TTL of name query results in milliseconds (0 = never expire)
    pub query_cache_ttl_ms: u64,
    /// Maximum entries in the entity cache
    pub entity_cache_limit: usize,
    /// TTL of fetched entities in milliseconds (0 = never expire)
    pub entity_cache_ttl_ms: u64,
    /// Base URL of the upstream catalog API
    pub api_base_url: String,
    /// Upstream request timeout in milliseconds
    pub api_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORAGE_PATH` - Storage file (default: pokeview-storage.json)
    /// - `STORAGE_PREFIX` - Key namespace (default: pokeview@)
    /// - `STORAGE_QUOTA_BYTES` - Storage budget (default: 5 MiB)
    /// - `NAMES_TTL_HOURS` - Name list lifetime (default: 24)
    /// - `QUERY_CACHE_LIMIT` / `QUERY_CACHE_TTL_MS` - (default: 100 / 60000)
    /// - `ENTITY_CACHE_LIMIT` / `ENTITY_CACHE_TTL_MS` - (default: 1000 / 600000)
    /// - `API_BASE_URL` - Upstream API (default: https://pokeapi.co/api/v2/)
    /// - `API_TIMEOUT_MS` - Upstream timeout (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parsed_var("SERVER_PORT").unwrap_or(defaults.server_port),
            storage_path: env::var("STORAGE_PATH").unwrap_or(defaults.storage_path),
            storage_prefix: env::var("STORAGE_PREFIX").unwrap_or(defaults.storage_prefix),
            storage_quota_bytes: parsed_var("STORAGE_QUOTA_BYTES")
                .unwrap_or(defaults.storage_quota_bytes),
            names_ttl_hours: parsed_var("NAMES_TTL_HOURS").unwrap_or(defaults.names_ttl_hours),
            query_cache_limit: parsed_var("QUERY_CACHE_LIMIT")
                .unwrap_or(defaults.query_cache_limit),
            query_cache_ttl_ms: parsed_var("QUERY_CACHE_TTL_MS")
                .unwrap_or(defaults.query_cache_ttl_ms),
            entity_cache_limit: parsed_var("ENTITY_CACHE_LIMIT")
                .unwrap_or(defaults.entity_cache_limit),
            entity_cache_ttl_ms: parsed_var("ENTITY_CACHE_TTL_MS")
                .unwrap_or(defaults.entity_cache_ttl_ms),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_timeout_ms: parsed_var("API_TIMEOUT_MS").unwrap_or(defaults.api_timeout_ms),
        }
    }

    /// Memo options for the name query cache.
    pub fn query_cache_options(&self) -> MemoOptions {
        MemoOptions {
            limit: self.query_cache_limit,
            ttl: Duration::from_millis(self.query_cache_ttl_ms),
            refresh_on_access: true,
        }
    }

    /// Memo options for the entity cache.
    pub fn entity_cache_options(&self) -> MemoOptions {
        MemoOptions {
            limit: self.entity_cache_limit,
            ttl: Duration::from_millis(self.entity_cache_ttl_ms),
            refresh_on_access: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            storage_path: "pokeview-storage.json".to_string(),
            storage_prefix: crate::storage::DEFAULT_PREFIX.to_string(),
            storage_quota_bytes: 5 * 1024 * 1024,
            names_ttl_hours: 24.0,
            query_cache_limit: 100,
            query_cache_ttl_ms: 60 * 1000,
            entity_cache_limit: 1000,
            entity_cache_ttl_ms: 10 * 60 * 1000,
            api_base_url: "https://pokeapi.co/api/v2/".to_string(),
            api_timeout_ms: 5000,
        }
    }
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
