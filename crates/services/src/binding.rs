//! Maps a session user and a binding id to the upstream token it holds.

use std::mem;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use drivegate_db::models::{ApiBinding, User};
use thiserror::Error;
use tracing::{debug, warn};

use crate::dao::base::{DaoError, DaoResult};
use crate::dooray::ApiToken;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_active(&self, user_id: ObjectId) -> DaoResult<Option<User>>;
}

#[async_trait]
pub trait BindingStore: Send + Sync {
    async fn find(&self, binding_id: ObjectId) -> DaoResult<Option<ApiBinding>>;
    /// Returns false when no binding matched.
    async fn set_connected(&self, binding_id: ObjectId, connected: bool) -> DaoResult<bool>;
    /// Connected bindings of a user, oldest first.
    async fn list_connected(&self, user_id: ObjectId) -> DaoResult<Vec<ApiBinding>>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("session user no longer exists")]
    Unauthenticated,
    #[error("api binding not found")]
    NotFound,
    #[error("api binding belongs to another user")]
    Forbidden,
    #[error(transparent)]
    Storage(#[from] DaoError),
}

/// A binding with its token moved into an [`ApiToken`].
///
/// `binding.token` is left empty so the record can be logged or mapped into
/// a response without carrying the credential.
#[derive(Debug)]
pub struct ResolvedBinding {
    pub token: ApiToken,
    pub binding: ApiBinding,
}

impl ResolvedBinding {
    fn from_binding(mut binding: ApiBinding) -> Self {
        let token = ApiToken::new(mem::take(&mut binding.token));
        Self { token, binding }
    }
}

#[derive(Clone)]
pub struct TokenResolver {
    users: Arc<dyn UserStore>,
    bindings: Arc<dyn BindingStore>,
}

impl TokenResolver {
    pub fn new(users: Arc<dyn UserStore>, bindings: Arc<dyn BindingStore>) -> Self {
        Self { users, bindings }
    }

    pub async fn resolve(
        &self,
        user_id: ObjectId,
        binding_id: ObjectId,
    ) -> Result<ResolvedBinding, ResolveError> {
        self.ensure_user(user_id).await?;

        let binding = self
            .bindings
            .find(binding_id)
            .await?
            .ok_or(ResolveError::NotFound)?;
        if binding.user_id != user_id {
            warn!(%user_id, %binding_id, "Rejected access to another user's api binding");
            return Err(ResolveError::Forbidden);
        }

        Ok(ResolvedBinding::from_binding(binding))
    }

    /// Marks the binding connected and stamps `last_used_at`.
    pub async fn connect(&self, user_id: ObjectId, binding_id: ObjectId) -> Result<(), ResolveError> {
        self.resolve(user_id, binding_id).await?;
        if !self.bindings.set_connected(binding_id, true).await? {
            return Err(ResolveError::NotFound);
        }
        debug!(%user_id, %binding_id, "Api binding connected");
        Ok(())
    }

    pub async fn disconnect(&self, user_id: ObjectId, binding_id: ObjectId) -> Result<bool, ResolveError> {
        self.resolve(user_id, binding_id).await?;
        let updated = self.bindings.set_connected(binding_id, false).await?;
        debug!(%user_id, %binding_id, updated, "Api binding disconnected");
        Ok(updated)
    }

    pub async fn connected(&self, user_id: ObjectId) -> Result<Vec<ResolvedBinding>, ResolveError> {
        self.ensure_user(user_id).await?;
        let bindings = self.bindings.list_connected(user_id).await?;
        Ok(bindings.into_iter().map(ResolvedBinding::from_binding).collect())
    }

    async fn ensure_user(&self, user_id: ObjectId) -> Result<User, ResolveError> {
        self.users
            .find_active(user_id)
            .await?
            .ok_or(ResolveError::Unauthenticated)
    }
}
