//! Cache-aside resolution layer.
//!
//! The read path checks the fast tier first and falls back to the store on
//! miss, repopulating on the way out. Fast-tier faults are soft: the resolve
//! path never fails because the cache is down, only store faults surface.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{FastTier, url_key};
use crate::clicks::ClickAccumulator;
use crate::errors::Result;
use crate::storage::LinkStore;

/// Fire-and-forget side effects of the hot path (TTL refresh, cache
/// repopulation, click recording). Excluded from the resolve latency budget;
/// tests call [`SideEffects::flush`] to await eventual state.
#[derive(Default)]
struct SideEffects {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl SideEffects {
    fn push(&self, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock().unwrap();
        // 已完成的任务顺手清掉，避免无限增长
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    async fn flush(&self) {
        let drained: Vec<JoinHandle<()>> = {
            let mut handles = self.handles.lock().unwrap();
            handles.drain(..).collect()
        };
        for handle in drained {
            let _ = handle.await;
        }
    }
}

pub struct Resolver {
    tier: Arc<dyn FastTier>,
    store: Arc<dyn LinkStore>,
    accumulator: Arc<ClickAccumulator>,
    ttl_secs: u64,
    side_effects: SideEffects,
}

impl Resolver {
    pub fn new(
        tier: Arc<dyn FastTier>,
        store: Arc<dyn LinkStore>,
        accumulator: Arc<ClickAccumulator>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            tier,
            store,
            accumulator,
            ttl_secs,
            side_effects: SideEffects::default(),
        }
    }

    /// Resolve a short id to its long URL.
    ///
    /// `Ok(None)` means the id does not exist; misses are never cached
    /// negatively. Only store faults produce an `Err`.
    pub async fn resolve(&self, id: &str) -> Result<Option<String>> {
        let key = url_key(id);

        match self.tier.get(&key).await {
            Ok(Some(long_url)) => {
                // 命中：滑动续期 + 记一次点击，都移出热路径
                let tier = self.tier.clone();
                let accumulator = self.accumulator.clone();
                let ttl = self.ttl_secs;
                let id = id.to_string();
                self.side_effects.push(tokio::spawn(async move {
                    if let Err(e) = tier.expire(&key, ttl).await {
                        debug!("TTL refresh failed for {}: {}", id, e);
                    }
                    accumulator.record(&id).await;
                }));

                return Ok(Some(long_url));
            }
            Ok(None) => {}
            Err(e) => {
                // 快速层故障降级到存储，不向调用方暴露
                debug!("Cache read failed for {}, falling back to store: {}", id, e);
            }
        }

        let Some(record) = self.store.find(id).await? else {
            debug!("Short id not found: {}", id);
            return Ok(None);
        };

        let long_url = record.long_url.clone();
        let tier = self.tier.clone();
        let accumulator = self.accumulator.clone();
        let ttl = self.ttl_secs;
        let id = id.to_string();
        self.side_effects.push(tokio::spawn(async move {
            if let Err(e) = tier.set_with_ttl(&key, &record.long_url, ttl).await {
                warn!("Cache repopulation failed for {}: {}", id, e);
            }
            accumulator.record(&id).await;
        }));

        Ok(Some(long_url))
    }

    /// Warm the cache entry after a successful create. Best-effort.
    pub async fn populate(&self, id: &str, long_url: &str) {
        if let Err(e) = self
            .tier
            .set_with_ttl(&url_key(id), long_url, self.ttl_secs)
            .await
        {
            warn!("Cache populate failed for {}: {}", id, e);
        }
    }

    /// Drop the cache entry and then any pending click counter, in that
    /// order, so a later drain cannot re-credit a deleted id. Best-effort.
    pub async fn invalidate(&self, id: &str) {
        if let Err(e) = self.tier.del(&url_key(id)).await {
            warn!("Cache invalidate failed for {}: {}", id, e);
        }
        self.accumulator.purge(id).await;
    }

    /// Await all pending hot-path side effects. Test hook.
    pub async fn flush_side_effects(&self) {
        self.side_effects.flush().await;
    }
}
