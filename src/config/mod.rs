//! Static application configuration.
//!
//! Loaded once at startup from a TOML file with environment variable
//! overrides. Access the singleton via [`get_config`] after [`init_config`].

mod r#impl;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub allocator: AllocatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token guarding the management API. Empty disables it.
    pub admin_token: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            admin_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlite | mysql | postgres
    pub backend: String,
    pub database_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            database_url: "sqlite://linklet.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// redis | memory
    pub backend: String,
    pub redis_url: String,
    pub key_prefix: String,
    /// Sliding TTL for url entries, in seconds.
    pub default_ttl: u64,
    /// Per-operation timeout; on expiry the caller degrades to the store.
    pub op_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: String::new(),
            default_ttl: 3600,
            op_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between click drain cycles, in seconds.
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub id_length: usize,
    pub max_attempts: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            id_length: 6,
            max_attempts: 10,
        }
    }
}

pub use r#impl::{get_config, init_config};
