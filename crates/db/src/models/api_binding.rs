use std::fmt;

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// An upstream API token registered by a user.
///
/// `token` is stored as-is because the upstream expects the raw value in
/// its `Authorization` header. It must never leave the service: handlers
/// map bindings to a response type without it.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiBinding {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub token: String,
    #[serde(default)]
    pub is_connected: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub last_used_at: Option<DateTime>,
}

impl ApiBinding {
    pub const COLLECTION: &'static str = "api_bindings";
}

impl fmt::Debug for ApiBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiBinding")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("title", &self.title)
            .field("token", &"***")
            .field("is_connected", &self.is_connected)
            .field("last_used_at", &self.last_used_at)
            .finish_non_exhaustive()
    }
}
