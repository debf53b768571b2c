//! Fast-tier client abstraction.
//!
//! The fast tier carries two kinds of keys: `url:{id}` cache entries with a
//! sliding TTL (advisory, losing one only costs a store read) and
//! `clicks:{id}` write-behind counters (no TTL, must survive until drained).
//! Every operation is an I/O suspension point; callers treat failures as
//! soft and degrade to the store.

use std::sync::Arc;
use tracing::error;

use crate::errors::{LinkletError, Result};

pub mod memory;
pub mod redis;

pub use memory::MemoryFastTier;
pub use redis::RedisFastTier;

/// Cache entry key for a resolved short id.
pub fn url_key(id: &str) -> String {
    format!("url:{}", id)
}

/// Accumulator key holding the click delta since the last drain.
pub fn clicks_key(id: &str) -> String {
    format!("clicks:{}", id)
}

/// Scan pattern matching all pending accumulator keys.
pub const CLICKS_PATTERN: &str = "clicks:*";

/// Strips the accumulator prefix back off a scanned key.
pub fn id_from_clicks_key(key: &str) -> &str {
    key.strip_prefix("clicks:").unwrap_or(key)
}

#[async_trait::async_trait]
pub trait FastTier: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    /// Refresh the TTL of an existing key (sliding expiration).
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()>;
    /// Atomic increment; creates the key at 1 if absent. No TTL.
    async fn incr(&self, key: &str) -> Result<i64>;
    async fn del(&self, key: &str) -> Result<()>;
    /// Non-blocking cursor iteration. A cycle is complete when the returned
    /// cursor is 0 again.
    async fn scan(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>)>;
}

pub struct FastTierFactory;

impl FastTierFactory {
    pub fn create() -> Result<Arc<dyn FastTier>> {
        let config = crate::config::get_config();

        match config.cache.backend.as_str() {
            "redis" => {
                let tier = RedisFastTier::new(
                    &config.cache.redis_url,
                    &config.cache.key_prefix,
                    config.cache.op_timeout_ms,
                )?;
                Ok(Arc::new(tier) as Arc<dyn FastTier>)
            }
            "memory" => Ok(Arc::new(MemoryFastTier::new()) as Arc<dyn FastTier>),
            other => {
                error!("Unknown fast tier backend: {}", other);
                Err(LinkletError::cache_connection(format!(
                    "Unknown fast tier backend: {}. Supported: redis, memory",
                    other
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_helpers() {
        assert_eq!(url_key("abc123"), "url:abc123");
        assert_eq!(clicks_key("abc123"), "clicks:abc123");
        assert_eq!(id_from_clicks_key("clicks:abc123"), "abc123");
    }
}
