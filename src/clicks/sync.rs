use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tokio::time::{Duration, sleep};
use tracing::{debug, error, info, warn};

use crate::cache::{CLICKS_PATTERN, FastTier, id_from_clicks_key};
use crate::clicks::ClickSink;
use crate::errors::LinkletError;

/// drain 的 future 被丢弃（任务被中断）时也要复位重入标记
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Reconciles fast-tier click counters into the store.
///
/// One daemon runs per process; multiple processes sharing the same fast
/// tier and store are safe because drains are idempotent per key. A failed
/// cycle never escapes: the recurring timer survives any single drain.
pub struct ClickSyncDaemon {
    tier: Arc<dyn FastTier>,
    sink: Arc<dyn ClickSink>,
    interval: Duration,
    // 防止同进程内 drain 重入
    draining: AtomicBool,
    stop: Notify,
}

impl ClickSyncDaemon {
    pub fn new(tier: Arc<dyn FastTier>, sink: Arc<dyn ClickSink>, interval: Duration) -> Self {
        Self {
            tier,
            sink,
            interval,
            draining: AtomicBool::new(false),
            stop: Notify::new(),
        }
    }

    /// 启动后台同步任务：先立即 drain 一次（补上上次进程崩溃遗留的计数），
    /// 然后按固定间隔循环，直到 [`ClickSyncDaemon::request_stop`]
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let daemon = self.clone();
        info!(
            "Click sync daemon started (every {}s)",
            daemon.interval.as_secs()
        );

        tokio::spawn(async move {
            daemon.drain().await;

            loop {
                tokio::select! {
                    _ = sleep(daemon.interval) => {
                        debug!("Click sync: interval drain triggered");
                        daemon.drain().await;
                    }
                    _ = daemon.stop.notified() => {
                        debug!("Click sync: stop requested, exiting background task");
                        break;
                    }
                }
            }
        })
    }

    /// 请求后台任务退出。协作式：进行中的 drain 周期会先做完，
    /// 调用方随后 await 任务句柄再执行最终 drain
    pub fn request_stop(&self) {
        self.stop.notify_one();
    }

    /// Drain all pending accumulator counters into the store.
    ///
    /// Returns the number of records updated. Never returns an error: a
    /// fast-tier fault skips the cycle, a store fault loses the cycle's
    /// already-deleted deltas (documented limitation).
    pub async fn drain(&self) -> u64 {
        if self.draining.swap(true, Ordering::SeqCst) {
            debug!("Click sync: drain already in progress, skipping");
            return 0;
        }
        let _guard = DrainGuard(&self.draining);

        self.drain_inner().await
    }

    async fn drain_inner(&self) -> u64 {
        let mut staged: Vec<(String, u64)> = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next_cursor, keys) = match self.tier.scan(cursor, CLICKS_PATTERN).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Click sync: fast tier unavailable, skipping cycle: {}", e);
                    return 0;
                }
            };

            for key in keys {
                let value = match self.tier.get(&key).await {
                    Ok(Some(value)) => value,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("Click sync: failed to read {}: {}", key, e);
                        continue;
                    }
                };

                let delta: u64 = value.parse().unwrap_or(0);
                if delta == 0 {
                    continue;
                }

                staged.push((id_from_clicks_key(&key).to_string(), delta));

                // 读后立删。与并发 record() 不是原子的：落在读和删之间的
                // 增量会丢失，这是可接受的近似计数
                if let Err(e) = self.tier.del(&key).await {
                    warn!("Click sync: failed to delete {}: {}", key, e);
                }
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        if staged.is_empty() {
            debug!("No click counts to sync");
            return 0;
        }

        let staged_count = staged.len();
        match self.sink.flush_clicks(staged).await {
            Ok(updated) => {
                info!("Synced click counts: {} records updated", updated);
                updated
            }
            Err(e) => {
                // 计数键已删除，本轮增量丢失
                let err = LinkletError::sync_partial_failure(format!(
                    "bulk write failed, {} staged deltas lost: {}",
                    staged_count, e
                ));
                error!("Click sync: {}", err);
                0
            }
        }
    }
}
