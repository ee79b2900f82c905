use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use drivegate_db::models::{IdentityProvider, User};
use mongodb::Database;

use super::base::{BaseDao, DaoResult};
use crate::binding::UserStore;

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    /// Records a user signed in through an identity provider.
    pub async fn create(
        &self,
        name: String,
        email: String,
        provider: IdentityProvider,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            name,
            email,
            provider,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_active(&self, user_id: ObjectId) -> DaoResult<Option<User>> {
        self.base
            .find_one(doc! { "_id": user_id, "deleted_at": null })
            .await
    }
}

#[async_trait]
impl UserStore for UserDao {
    async fn find_active(&self, user_id: ObjectId) -> DaoResult<Option<User>> {
        UserDao::find_active(self, user_id).await
    }
}
