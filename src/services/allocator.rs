use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{LinkletError, Result};
use crate::storage::LinkStore;
use crate::utils::generate_random_id;

/// Collision-avoiding short id allocator.
///
/// Returns an id absent from the store at check time. The check-then-insert
/// race against a concurrent allocation is closed at insert time by the
/// store's unique constraint, not here.
pub struct IdAllocator {
    store: Arc<dyn LinkStore>,
    id_length: usize,
    max_attempts: usize,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn LinkStore>, id_length: usize, max_attempts: usize) -> Self {
        Self {
            store,
            id_length,
            max_attempts,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub async fn allocate(&self) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let id = generate_random_id(self.id_length);

            if !self.store.exists(&id).await? {
                debug!("Allocated short id: {} (attempt {})", id, attempt);
                return Ok(id);
            }

            warn!("Short id collision detected: {} (attempt {})", id, attempt);
        }

        Err(LinkletError::allocation_exhausted(format!(
            "No free short id after {} attempts",
            self.max_attempts
        )))
    }
}
