use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use drivegate_db::models::ApiBinding;
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::binding::BindingStore;

pub struct ApiBindingDao {
    pub base: BaseDao<ApiBinding>,
}

impl ApiBindingDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ApiBinding::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        user_id: ObjectId,
        title: String,
        token: String,
    ) -> DaoResult<ApiBinding> {
        let now = DateTime::now();
        let binding = ApiBinding {
            id: None,
            user_id,
            title,
            token,
            is_connected: false,
            created_at: now,
            updated_at: now,
            last_used_at: None,
        };

        let id = self.base.insert_one(&binding).await?;
        self.base.find_by_id(id).await
    }
}

#[async_trait]
impl BindingStore for ApiBindingDao {
    async fn find(&self, binding_id: ObjectId) -> DaoResult<Option<ApiBinding>> {
        self.base.find_one(doc! { "_id": binding_id }).await
    }

    async fn set_connected(&self, binding_id: ObjectId, connected: bool) -> DaoResult<bool> {
        let update = if connected {
            doc! { "$set": { "is_connected": true, "last_used_at": DateTime::now() } }
        } else {
            doc! { "$set": { "is_connected": false } }
        };
        self.base.update_by_id(binding_id, update).await
    }

    async fn list_connected(&self, user_id: ObjectId) -> DaoResult<Vec<ApiBinding>> {
        self.base
            .find_many(
                doc! { "user_id": user_id, "is_connected": true },
                Some(doc! { "created_at": 1, "_id": 1 }),
            )
            .await
    }
}
