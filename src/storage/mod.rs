use std::sync::Arc;
use tracing::error;

use crate::clicks::ClickSink;
use crate::errors::{LinkletError, Result};

pub mod backends;
pub mod models;

pub use models::{NewLink, ShortLinkRecord};

/// Authoritative persistent store for short links.
///
/// Store faults are user-visible; callers abort on them. Id uniqueness is
/// enforced here: a duplicate insert fails atomically with `DuplicateId`,
/// which closes the allocator's check-then-insert race.
#[async_trait::async_trait]
pub trait LinkStore: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn find(&self, id: &str) -> Result<Option<ShortLinkRecord>>;
    async fn create(&self, link: NewLink) -> Result<ShortLinkRecord>;
    async fn delete(&self, id: &str, owner: &str) -> Result<()>;
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<ShortLinkRecord>>;

    /// 点击量批量写入接口
    fn as_click_sink(&self) -> Option<Arc<dyn ClickSink>> {
        None
    }
}

pub struct StoreFactory;

impl StoreFactory {
    pub async fn create() -> Result<Arc<dyn LinkStore>> {
        let config = crate::config::get_config();
        let backend = &config.database.backend;
        let database_url = &config.database.database_url;

        match backend.as_str() {
            "sqlite" | "mysql" | "postgres" | "mariadb" => {
                let store = backends::sea_orm::SeaOrmStore::new(database_url, backend).await?;
                Ok(Arc::new(store) as Arc<dyn LinkStore>)
            }
            _ => {
                error!("Unknown store backend: {}", backend);
                Err(LinkletError::database_config(format!(
                    "Unknown store backend: {}. Supported: sqlite, mysql, postgres, mariadb",
                    backend
                )))
            }
        }
    }
}
