//! LinkService tests
//!
//! Full create/resolve/delete lifecycle over the in-memory fast tier and a
//! mock store, including the drain interactions around deletion.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Duration;

use linklet::cache::{FastTier, MemoryFastTier, url_key};
use linklet::clicks::{ClickAccumulator, ClickSink, ClickSyncDaemon};
use linklet::errors::{LinkletError, Result};
use linklet::runtime::{AppContext, perform_shutdown_tasks};
use linklet::services::{CreateLinkRequest, IdAllocator, LinkService, Resolver};
use linklet::storage::{LinkStore, NewLink, ShortLinkRecord};

// =============================================================================
// Test Setup
// =============================================================================

#[derive(Clone, Default)]
struct MockStore {
    links: Arc<RwLock<HashMap<String, ShortLinkRecord>>>,
}

impl MockStore {
    fn new() -> Self {
        Self::default()
    }

    async fn clicks(&self, id: &str) -> i64 {
        self.links
            .read()
            .await
            .get(id)
            .map(|r| r.clicks)
            .unwrap_or(0)
    }
}

#[async_trait]
impl LinkStore for MockStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.links.read().await.contains_key(id))
    }

    async fn find(&self, id: &str) -> Result<Option<ShortLinkRecord>> {
        Ok(self.links.read().await.get(id).cloned())
    }

    async fn create(&self, link: NewLink) -> Result<ShortLinkRecord> {
        let mut links = self.links.write().await;
        if links.contains_key(&link.short_id) {
            return Err(LinkletError::duplicate_id(link.short_id));
        }
        let record = ShortLinkRecord {
            short_id: link.short_id.clone(),
            long_url: link.long_url,
            owner: link.owner,
            title: link.title,
            clicks: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        links.insert(link.short_id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<()> {
        let mut links = self.links.write().await;
        match links.get(id) {
            Some(record) if record.owner == owner => {
                links.remove(id);
                Ok(())
            }
            _ => Err(LinkletError::not_found(id)),
        }
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ShortLinkRecord>> {
        Ok(self
            .links
            .read()
            .await
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }

    fn as_click_sink(&self) -> Option<Arc<dyn ClickSink>> {
        Some(Arc::new(self.clone()) as Arc<dyn ClickSink>)
    }
}

#[async_trait]
impl ClickSink for MockStore {
    async fn flush_clicks(&self, updates: Vec<(String, u64)>) -> anyhow::Result<u64> {
        let mut links = self.links.write().await;
        let mut updated = 0;
        for (id, delta) in updates {
            if let Some(record) = links.get_mut(&id) {
                record.clicks += delta as i64;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

struct TestApp {
    tier: Arc<MemoryFastTier>,
    store: MockStore,
    resolver: Arc<Resolver>,
    service: Arc<LinkService>,
    daemon: Arc<ClickSyncDaemon>,
}

fn setup() -> TestApp {
    let tier = Arc::new(MemoryFastTier::new());
    let store = MockStore::new();
    let store_arc: Arc<dyn LinkStore> = Arc::new(store.clone());
    let accumulator = Arc::new(ClickAccumulator::new(tier.clone() as Arc<dyn FastTier>));
    let resolver = Arc::new(Resolver::new(
        tier.clone() as Arc<dyn FastTier>,
        store_arc.clone(),
        accumulator,
        3600,
    ));
    let allocator = IdAllocator::new(store_arc.clone(), 6, 10);
    let service = Arc::new(LinkService::new(
        store_arc.clone(),
        resolver.clone(),
        allocator,
    ));
    let daemon = Arc::new(ClickSyncDaemon::new(
        tier.clone() as Arc<dyn FastTier>,
        store_arc.as_click_sink().unwrap(),
        Duration::from_secs(300),
    ));
    TestApp {
        tier,
        store,
        resolver,
        service,
        daemon,
    }
}

fn create_request(id: Option<&str>, long_url: &str) -> CreateLinkRequest {
    CreateLinkRequest {
        id: id.map(str::to_string),
        long_url: long_url.to_string(),
        owner: "admin".to_string(),
        title: None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_create_with_custom_id_resolves_before_any_drain() {
    let app = setup();

    let record = app
        .service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();
    assert_eq!(record.short_id, "promo");

    let resolved = app.resolver.resolve("promo").await.unwrap();
    assert_eq!(resolved.as_deref(), Some("https://x.test"));
}

#[tokio::test]
async fn test_create_populates_cache() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    assert_eq!(
        app.tier.get(&url_key("promo")).await.unwrap().as_deref(),
        Some("https://x.test")
    );
}

#[tokio::test]
async fn test_create_allocates_id_when_none_given() {
    let app = setup();

    let record = app
        .service
        .create(create_request(None, "https://example.com"))
        .await
        .unwrap();

    assert_eq!(record.short_id.len(), 6);
    assert!(app.store.exists(&record.short_id).await.unwrap());
}

#[tokio::test]
async fn test_create_duplicate_custom_id_conflicts() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    let err = app
        .service
        .create(create_request(Some("promo"), "https://y.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkletError::DuplicateId(_)));
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let app = setup();

    let err = app
        .service
        .create(create_request(Some("promo"), "javascript:alert(1)"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkletError::Validation(_)));

    let err = app
        .service
        .create(create_request(Some("a!"), "https://x.test"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkletError::Validation(_)));
}

#[tokio::test]
async fn test_create_survives_fast_tier_outage() {
    let app = setup();
    app.tier.set_unavailable(true);

    // populate 失败只会降级，创建本身必须成功
    let record = app
        .service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();
    assert_eq!(record.short_id, "promo");

    app.tier.set_unavailable(false);
    let resolved = app.resolver.resolve("promo").await.unwrap();
    assert_eq!(resolved.as_deref(), Some("https://x.test"));
}

#[tokio::test]
async fn test_delete_then_resolve_is_not_found_and_drains_nothing() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    // 删除前制造一些待同步点击
    for _ in 0..3 {
        app.resolver.resolve("promo").await.unwrap();
    }
    app.resolver.flush_side_effects().await;

    app.service.delete("promo", "admin").await.unwrap();

    for _ in 0..5 {
        assert_eq!(app.resolver.resolve("promo").await.unwrap(), None);
    }
    app.resolver.flush_side_effects().await;

    // 已删 ID 不得给后续 drain 贡献任何更新
    assert_eq!(app.daemon.drain().await, 0);
    assert_eq!(app.store.clicks("promo").await, 0);
}

#[tokio::test]
async fn test_delete_requires_matching_owner() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    let err = app.service.delete("promo", "intruder").await.unwrap_err();
    assert!(matches!(err, LinkletError::NotFound(_)));
    assert!(app.store.exists("promo").await.unwrap());
}

#[tokio::test]
async fn test_clicks_flow_end_to_end() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    for _ in 0..4 {
        app.resolver.resolve("promo").await.unwrap();
    }
    app.resolver.flush_side_effects().await;

    assert_eq!(app.daemon.drain().await, 1);
    assert_eq!(app.store.clicks("promo").await, 4);

    // 再次 drain 为空操作
    assert_eq!(app.daemon.drain().await, 0);
    assert_eq!(app.store.clicks("promo").await, 4);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_sequence_flushes_backlog() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    let handle = app.daemon.spawn();
    tokio::time::sleep(Duration::from_millis(1)).await;

    // 启动 drain 之后产生的点击构成关闭前的积压
    for _ in 0..3 {
        app.resolver.resolve("promo").await.unwrap();
    }
    app.resolver.flush_side_effects().await;

    let ctx = AppContext {
        store: Arc::new(app.store.clone()),
        tier: app.tier.clone() as Arc<dyn FastTier>,
        resolver: app.resolver.clone(),
        link_service: app.service.clone(),
        sync_daemon: app.daemon.clone(),
    };
    perform_shutdown_tasks(&ctx, handle).await;

    // 后台任务还在运行时关闭，积压也必须在退出前落库
    assert_eq!(app.store.clicks("promo").await, 3);
}

#[tokio::test]
async fn test_get_info_and_list_are_owner_scoped() {
    let app = setup();

    app.service
        .create(create_request(Some("promo"), "https://x.test"))
        .await
        .unwrap();

    let info = app.service.get_info("promo", "admin").await.unwrap();
    assert_eq!(info.long_url, "https://x.test");

    let err = app.service.get_info("promo", "intruder").await.unwrap_err();
    assert!(matches!(err, LinkletError::NotFound(_)));

    assert_eq!(app.service.list("admin").await.unwrap().len(), 1);
    assert!(app.service.list("intruder").await.unwrap().is_empty());
}
