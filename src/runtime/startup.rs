use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cache::{FastTier, FastTierFactory};
use crate::clicks::{ClickAccumulator, ClickSyncDaemon};
use crate::config::get_config;
use crate::services::{IdAllocator, LinkService, Resolver};
use crate::storage::{LinkStore, StoreFactory};

/// Everything the server and the shutdown sequencer need, constructed once
/// at startup and threaded through explicitly. No ambient singletons for
/// the fast-tier client or the daemon.
pub struct AppContext {
    pub store: Arc<dyn LinkStore>,
    pub tier: Arc<dyn FastTier>,
    pub resolver: Arc<Resolver>,
    pub link_service: Arc<LinkService>,
    pub sync_daemon: Arc<ClickSyncDaemon>,
}

pub async fn prepare_startup() -> Result<AppContext> {
    let start_time = std::time::Instant::now();
    let config = get_config();

    let store = StoreFactory::create()
        .await
        .context("Failed to create store backend")?;

    let tier = FastTierFactory::create().context("Failed to create fast tier client")?;

    let accumulator = Arc::new(ClickAccumulator::new(tier.clone()));

    let sink = store
        .as_click_sink()
        .context("Store backend does not support click accounting")?;
    let sync_daemon = Arc::new(ClickSyncDaemon::new(
        tier.clone(),
        sink,
        Duration::from_secs(config.sync.interval_secs),
    ));

    let resolver = Arc::new(Resolver::new(
        tier.clone(),
        store.clone(),
        accumulator,
        config.cache.default_ttl,
    ));

    let allocator = IdAllocator::new(
        store.clone(),
        config.allocator.id_length,
        config.allocator.max_attempts,
    );
    let link_service = Arc::new(LinkService::new(store.clone(), resolver.clone(), allocator));

    debug!("Startup context prepared in {:?}", start_time.elapsed());

    Ok(AppContext {
        store,
        tier,
        resolver,
        link_service,
        sync_daemon,
    })
}
