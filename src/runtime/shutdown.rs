use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info};

use crate::runtime::AppContext;

/// 单个关闭任务的超时时间（秒）
const TASK_TIMEOUT_SECS: u64 = 10;

/// Final synchronous drain, awaited before process exit.
///
/// Runs on both the graceful path and the fatal-error path out of `main`,
/// so exit loses at most the current interval's deltas, never the backlog.
/// The background task is stopped cooperatively first: an in-flight cycle
/// gets to finish instead of being killed between its read and its flush.
pub async fn perform_shutdown_tasks(ctx: &AppContext, daemon_handle: JoinHandle<()>) {
    info!("Shutting down, draining pending click counts...");

    ctx.sync_daemon.request_stop();
    if timeout(Duration::from_secs(TASK_TIMEOUT_SECS), daemon_handle)
        .await
        .is_err()
    {
        error!(
            "Click sync task did not stop within {} seconds",
            TASK_TIMEOUT_SECS
        );
    }

    match timeout(
        Duration::from_secs(TASK_TIMEOUT_SECS),
        ctx.sync_daemon.drain(),
    )
    .await
    {
        Ok(updated) => {
            info!("Final click drain completed: {} records updated", updated);
        }
        Err(_) => {
            error!(
                "Final click drain timed out after {} seconds",
                TASK_TIMEOUT_SECS
            );
        }
    }
}
