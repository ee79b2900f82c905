use bson::oid::ObjectId;
use drivegate_db::models::IdentityProvider;
use drivegate_services::AuthService;
use drivegate_services::binding::BindingStore;
use drivegate_services::dao::{api_binding::ApiBindingDao, user::UserDao};

use super::test_app::TestApp;

pub struct SeededUser {
    pub id: ObjectId,
    pub email: String,
    pub access_token: String,
}

impl TestApp {
    /// Insert a user directly and mint a session token for it.
    pub async fn seed_user(&self, name: &str) -> SeededUser {
        let email = format!("{}@example.com", name);
        let user = UserDao::new(&self.db)
            .create(name.to_string(), email.clone(), IdentityProvider::Google)
            .await
            .expect("Failed to seed user");
        let id = user.id.expect("Seeded user has no id");

        let access_token = AuthService::new(self.settings.jwt.clone())
            .issue_access_token(id, &email, name)
            .expect("Failed to issue access token");

        SeededUser {
            id,
            email,
            access_token,
        }
    }

    /// Insert an api binding holding `token`, optionally already connected.
    pub async fn seed_binding(
        &self,
        user: &SeededUser,
        title: &str,
        token: &str,
        connected: bool,
    ) -> ObjectId {
        let dao = ApiBindingDao::new(&self.db);
        let binding = dao
            .create(user.id, title.to_string(), token.to_string())
            .await
            .expect("Failed to seed binding");
        let id = binding.id.expect("Seeded binding has no id");
        if connected {
            dao.set_connected(id, true)
                .await
                .expect("Failed to connect binding");
        }
        id
    }

    pub async fn binding_connected(&self, binding_id: ObjectId) -> bool {
        ApiBindingDao::new(&self.db)
            .find(binding_id)
            .await
            .expect("Failed to load binding")
            .map(|b| b.is_connected)
            .unwrap_or(false)
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }
}
