//! Link management service
//!
//! Business logic for creating and deleting short links, shared by the HTTP
//! handlers. Creation allocates an id when none is given; deletion tears
//! down the store record, the cache entry and any pending click counter.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{LinkletError, Result};
use crate::services::{IdAllocator, Resolver};
use crate::storage::{LinkStore, NewLink, ShortLinkRecord};
use crate::utils::is_valid_short_id;
use crate::utils::url_validator::validate_url;

/// Request to create a new link
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    /// Short id (optional, allocated if not provided)
    pub id: Option<String>,
    /// Target URL
    pub long_url: String,
    pub owner: String,
    pub title: Option<String>,
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    resolver: Arc<Resolver>,
    allocator: IdAllocator,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, resolver: Arc<Resolver>, allocator: IdAllocator) -> Self {
        Self {
            store,
            resolver,
            allocator,
        }
    }

    pub async fn create(&self, req: CreateLinkRequest) -> Result<ShortLinkRecord> {
        validate_url(&req.long_url).map_err(LinkletError::validation)?;

        if let Some(id) = &req.id {
            if !is_valid_short_id(id) {
                return Err(LinkletError::validation(format!(
                    "Invalid short id: '{}'. Expected 3-20 characters from [A-Za-z0-9_-]",
                    id
                )));
            }

            // 自定义 ID：占用即冲突，直接冒泡给调用方
            let record = self
                .store
                .create(NewLink {
                    short_id: id.clone(),
                    long_url: req.long_url.clone(),
                    owner: req.owner.clone(),
                    title: req.title.clone(),
                })
                .await?;
            self.resolver.populate(&record.short_id, &record.long_url).await;
            return Ok(record);
        }

        // 随机分配 ID：插入时撞上并发分配则重新分配
        for _ in 0..self.allocator.max_attempts() {
            let id = self.allocator.allocate().await?;

            match self
                .store
                .create(NewLink {
                    short_id: id.clone(),
                    long_url: req.long_url.clone(),
                    owner: req.owner.clone(),
                    title: req.title.clone(),
                })
                .await
            {
                Ok(record) => {
                    info!("Link created: {} -> {}", record.short_id, record.long_url);
                    self.resolver.populate(&record.short_id, &record.long_url).await;
                    return Ok(record);
                }
                Err(LinkletError::DuplicateId(_)) => {
                    warn!("Insert of {} raced a concurrent allocation, retrying", id);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(LinkletError::allocation_exhausted(format!(
            "Insert kept colliding after {} allocations",
            self.allocator.max_attempts()
        )))
    }

    /// Delete flow: store delete → cache invalidate → accumulator purge.
    pub async fn delete(&self, id: &str, owner: &str) -> Result<()> {
        self.store.delete(id, owner).await?;
        self.resolver.invalidate(id).await;
        info!("Link deleted: {}", id);
        Ok(())
    }

    pub async fn get_info(&self, id: &str, owner: &str) -> Result<ShortLinkRecord> {
        match self.store.find(id).await? {
            Some(record) if record.owner == owner => Ok(record),
            _ => Err(LinkletError::not_found(format!(
                "Short link not found: {}",
                id
            ))),
        }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<ShortLinkRecord>> {
        self.store.list_by_owner(owner).await
    }
}
