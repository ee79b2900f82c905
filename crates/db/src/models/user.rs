use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A signed-in principal. Rows are created by the external login flow;
/// the gateway only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(rename = "oauth_provider")]
    pub provider: IdentityProvider,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProvider {
    Google,
    Kakao,
}

impl User {
    pub const COLLECTION: &'static str = "users";
}
