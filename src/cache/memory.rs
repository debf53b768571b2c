use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{Duration, Instant};

use crate::cache::FastTier;
use crate::errors::{LinkletError, Result};

struct Entry {
    value: String,
    /// None 表示永不过期（计数键）
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(deadline) if deadline <= Instant::now())
    }
}

/// In-process fast tier for tests and single-node deployments.
///
/// Expiration is enforced lazily on access. The `unavailable` switch makes
/// every operation fail with a connection error, which is how tests exercise
/// the degraded paths.
#[derive(Default)]
pub struct MemoryFastTier {
    entries: DashMap<String, Entry>,
    unavailable: AtomicBool,
}

impl MemoryFastTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a full fast-tier outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LinkletError::cache_connection("fast tier unreachable"));
        }
        Ok(())
    }

    /// Glob 匹配：只支持尾部通配符（SCAN 模式足够用）
    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

#[async_trait]
impl FastTier for MemoryFastTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;

        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.check_available()?;

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_secs)),
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<()> {
        self.check_available()?;

        if let Some(mut entry) = self.entries.get_mut(key) {
            if !entry.is_expired() {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs));
            }
        }
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.check_available()?;

        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: "0".to_string(),
            expires_at: None,
        });
        let current: i64 = if entry.is_expired() {
            0
        } else {
            entry.value.parse().unwrap_or(0)
        };
        let next = current + 1;
        entry.value = next.to_string();
        entry.expires_at = None;
        Ok(next)
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.check_available()?;

        self.entries.remove(key);
        Ok(())
    }

    async fn scan(&self, _cursor: u64, pattern: &str) -> Result<(u64, Vec<String>)> {
        self.check_available()?;

        let keys = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired() && Self::matches(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        // 单次快照即完成一轮迭代
        Ok((0, keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_del() {
        let tier = MemoryFastTier::new();
        tier.set_with_ttl("url:abc", "https://example.com", 60)
            .await
            .unwrap();
        assert_eq!(
            tier.get("url:abc").await.unwrap().as_deref(),
            Some("https://example.com")
        );

        tier.del("url:abc").await.unwrap();
        assert_eq!(tier.get("url:abc").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let tier = MemoryFastTier::new();
        tier.set_with_ttl("url:abc", "v", 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(tier.get("url:abc").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sliding_ttl_refresh_keeps_entry_alive() {
        let tier = MemoryFastTier::new();
        tier.set_with_ttl("url:abc", "v", 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        tier.expire("url:abc", 60).await.unwrap();
        tokio::time::advance(Duration::from_secs(50)).await;

        // 100s after insert but only 50s after refresh
        assert!(tier.get("url:abc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_incr_has_no_ttl() {
        let tier = MemoryFastTier::new();
        assert_eq!(tier.incr("clicks:abc").await.unwrap(), 1);
        assert_eq!(tier.incr("clicks:abc").await.unwrap(), 2);
        assert_eq!(tier.incr("clicks:abc").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_scan_matches_prefix_only() {
        let tier = MemoryFastTier::new();
        tier.incr("clicks:a").await.unwrap();
        tier.incr("clicks:b").await.unwrap();
        tier.set_with_ttl("url:a", "v", 60).await.unwrap();

        let (cursor, mut keys) = tier.scan(0, "clicks:*").await.unwrap();
        keys.sort();
        assert_eq!(cursor, 0);
        assert_eq!(keys, vec!["clicks:a", "clicks:b"]);
    }

    #[tokio::test]
    async fn test_unavailable_mode_fails_everything() {
        let tier = MemoryFastTier::new();
        tier.set_unavailable(true);

        assert!(tier.get("url:abc").await.is_err());
        assert!(tier.set_with_ttl("url:abc", "v", 60).await.is_err());
        assert!(tier.incr("clicks:abc").await.is_err());
        assert!(tier.scan(0, "clicks:*").await.is_err());

        tier.set_unavailable(false);
        assert!(tier.get("url:abc").await.is_ok());
    }
}
