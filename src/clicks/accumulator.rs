use std::sync::Arc;

use tracing::{trace, warn};

use crate::cache::{FastTier, clicks_key};

/// Per-id click counters held in the fast tier.
///
/// Increments never go to the store directly; the sync daemon drains them in
/// batch. Every method is best-effort: a fast-tier fault is logged and
/// swallowed, the caller is never failed.
pub struct ClickAccumulator {
    tier: Arc<dyn FastTier>,
}

impl ClickAccumulator {
    pub fn new(tier: Arc<dyn FastTier>) -> Self {
        Self { tier }
    }

    /// 记录一次点击（尽力而为，绝不阻塞调用方）
    pub async fn record(&self, id: &str) {
        match self.tier.incr(&clicks_key(id)).await {
            Ok(count) => trace!("Click recorded for {}: pending delta {}", id, count),
            Err(e) => warn!("Failed to record click for {}: {}", id, e),
        }
    }

    /// 删除待同步的计数（链接删除时调用，防止后续 drain 给已删 ID 回账）
    pub async fn purge(&self, id: &str) {
        if let Err(e) = self.tier.del(&clicks_key(id)).await {
            warn!("Failed to purge pending clicks for {}: {}", id, e);
        }
    }

    /// 读取某个 ID 尚未同步的点击增量
    pub async fn pending(&self, id: &str) -> u64 {
        match self.tier.get(&clicks_key(id)).await {
            Ok(Some(value)) => value.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                warn!("Failed to read pending clicks for {}: {}", id, e);
                0
            }
        }
    }
}
