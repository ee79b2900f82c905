use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use drivegate_db::models::RecentFile;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::recent::RecentFileStore;

pub struct RecentFileDao {
    pub base: BaseDao<RecentFile>,
}

impl RecentFileDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, RecentFile::COLLECTION),
        }
    }
}

#[async_trait]
impl RecentFileStore for RecentFileDao {
    async fn find(&self, user_id: ObjectId, file_id: &str) -> DaoResult<Option<RecentFile>> {
        self.base
            .find_one(doc! { "user_id": user_id, "file_id": file_id })
            .await
    }

    async fn count(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base.count(doc! { "user_id": user_id }).await
    }

    async fn oldest(&self, user_id: ObjectId) -> DaoResult<Option<RecentFile>> {
        Ok(self
            .base
            .collection()
            .find_one(doc! { "user_id": user_id })
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?)
    }

    async fn delete(&self, entry_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(entry_id).await
    }

    async fn insert(&self, user_id: ObjectId, file_id: &str) -> DaoResult<RecentFile> {
        let entry = RecentFile {
            id: None,
            user_id,
            file_id: file_id.to_string(),
            created_at: DateTime::now(),
        };
        let id = self.base.insert_one(&entry).await?;
        Ok(RecentFile {
            id: Some(id),
            ..entry
        })
    }

    async fn list(&self, user_id: ObjectId) -> DaoResult<Vec<RecentFile>> {
        self.base
            .find_many(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": 1, "_id": 1 }),
            )
            .await
    }
}
