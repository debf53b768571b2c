use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

use super::AppConfig;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 初始化全局配置（只允许初始化一次）
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

/// 获取全局配置
pub fn get_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::load)
}

impl AppConfig {
    /// Load configuration from TOML file with environment variable fallback
    pub fn load() -> Self {
        let mut config = Self::load_from_file();
        config.override_with_env();
        config
    }

    /// Load configuration from TOML file
    fn load_from_file() -> Self {
        let config_paths = ["config.toml", "linklet.toml", "/etc/linklet/config.toml"];

        for path in &config_paths {
            if Path::new(path).exists() {
                debug!("Loading config from: {}", path);
                match fs::read_to_string(path) {
                    Ok(content) => match toml::from_str::<AppConfig>(&content) {
                        Ok(config) => {
                            debug!("Successfully loaded config from: {}", path);
                            return config;
                        }
                        Err(e) => {
                            warn!("Failed to parse config file {}: {}", path, e);
                        }
                    },
                    Err(e) => {
                        warn!("Failed to read config file {}: {}", path, e);
                    }
                }
            }
        }

        debug!("No config file found, using defaults");
        Self::default()
    }

    /// Override configuration with environment variables
    fn override_with_env(&mut self) {
        // Server config
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            } else {
                error!("Invalid SERVER_PORT: {}", port);
            }
        }
        if let Ok(token) = env::var("ADMIN_TOKEN") {
            self.server.admin_token = token;
        }

        // Database config
        if let Ok(backend) = env::var("DATABASE_BACKEND") {
            self.database.backend = backend;
        }
        if let Ok(database_url) = env::var("DATABASE_URL") {
            self.database.database_url = database_url;
        }

        // Cache config
        if let Ok(backend) = env::var("CACHE_BACKEND") {
            self.cache.backend = backend;
        }
        if let Ok(redis_url) = env::var("REDIS_URL") {
            self.cache.redis_url = redis_url;
        }
        if let Ok(prefix) = env::var("REDIS_KEY_PREFIX") {
            self.cache.key_prefix = prefix;
        }
        if let Ok(default_ttl) = env::var("CACHE_DEFAULT_TTL") {
            if let Ok(ttl) = default_ttl.parse() {
                self.cache.default_ttl = ttl;
            } else {
                error!("Invalid CACHE_DEFAULT_TTL: {}", default_ttl);
            }
        }
        if let Ok(timeout) = env::var("CACHE_OP_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.cache.op_timeout_ms = t;
            } else {
                error!("Invalid CACHE_OP_TIMEOUT_MS: {}", timeout);
            }
        }

        // Click sync config
        if let Ok(interval) = env::var("SYNC_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse() {
                self.sync.interval_secs = secs;
            } else {
                error!("Invalid SYNC_INTERVAL_SECS: {}", interval);
            }
        }

        // Allocator config
        if let Ok(length) = env::var("ID_LENGTH") {
            if let Ok(n) = length.parse() {
                self.allocator.id_length = n;
            } else {
                error!("Invalid ID_LENGTH: {}", length);
            }
        }
        if let Ok(attempts) = env::var("ID_MAX_ATTEMPTS") {
            if let Ok(n) = attempts.parse() {
                self.allocator.max_attempts = n;
            } else {
                error!("Invalid ID_MAX_ATTEMPTS: {}", attempts);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.default_ttl, 3600);
        assert_eq!(config.sync.interval_secs, 300);
        assert_eq!(config.allocator.id_length, 6);
        assert_eq!(config.allocator.max_attempts, 10);
    }

    #[test]
    fn test_parse_toml_sections() {
        let toml = r#"
            [server]
            port = 9090

            [cache]
            backend = "memory"
            default_ttl = 60
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.default_ttl, 60);
        // 未指定的段保持默认值
        assert_eq!(config.database.backend, "sqlite");
    }
}
