//! Bounded per-user list of recently opened files.

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;
use drivegate_db::models::RecentFile;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dao::base::{DaoError, DaoResult};

#[async_trait]
pub trait RecentFileStore: Send + Sync {
    async fn find(&self, user_id: ObjectId, file_id: &str) -> DaoResult<Option<RecentFile>>;
    async fn count(&self, user_id: ObjectId) -> DaoResult<u64>;
    /// First entry of the user in insertion order.
    async fn oldest(&self, user_id: ObjectId) -> DaoResult<Option<RecentFile>>;
    async fn delete(&self, entry_id: ObjectId) -> DaoResult<bool>;
    async fn insert(&self, user_id: ObjectId, file_id: &str) -> DaoResult<RecentFile>;
    /// All entries of the user in insertion order.
    async fn list(&self, user_id: ObjectId) -> DaoResult<Vec<RecentFile>>;
}

#[derive(Debug, Error)]
pub enum RecentError {
    #[error("recent files storage error: {0}")]
    Storage(#[from] DaoError),
}

pub struct RecentFileRing {
    store: Arc<dyn RecentFileStore>,
    capacity: usize,
    locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl RecentFileRing {
    pub fn new(store: Arc<dyn RecentFileStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            locks: DashMap::new(),
        }
    }

    /// Records `file_id` as the user's most recent file.
    ///
    /// An existing entry for the file is removed and re-created; otherwise the
    /// oldest entries are evicted until there is room. The sequence runs under
    /// a per-user lock.
    pub async fn touch(&self, user_id: ObjectId, file_id: &str) -> Result<RecentFile, RecentError> {
        let lock = self.locks.entry(user_id).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            self.touch_locked(user_id, file_id).await
        };
        drop(lock);
        self.locks
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn touch_locked(&self, user_id: ObjectId, file_id: &str) -> Result<RecentFile, RecentError> {
        match self.store.find(user_id, file_id).await? {
            Some(existing) => {
                if let Some(id) = existing.id {
                    self.store.delete(id).await?;
                }
            }
            None => {
                while self.store.count(user_id).await? >= self.capacity as u64 {
                    let Some(oldest) = self.store.oldest(user_id).await? else {
                        break;
                    };
                    let Some(id) = oldest.id else {
                        break;
                    };
                    self.store.delete(id).await?;
                    debug!(%user_id, file_id = %oldest.file_id, "Evicted oldest recent file");
                }
            }
        }

        Ok(self.store.insert(user_id, file_id).await?)
    }

    /// Entries newest first.
    pub async fn list(&self, user_id: ObjectId) -> Result<Vec<RecentFile>, RecentError> {
        let mut entries = self.store.list(user_id).await?;
        entries.reverse();
        Ok(entries)
    }
}
