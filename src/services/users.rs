use crate::api_client::ApiClient;
use crate::error::Result;
use crate::models::{Page, User};
use crate::session_manager::TokenRefresher;
use serde_json::Value;

/// `/users/` (admin) and `/users/me/`
pub struct Users<'a, R> {
    api: &'a ApiClient<R>,
}

impl<'a, R: TokenRefresher> Users<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self { api }
    }

    pub async fn me(&self) -> Result<User> {
        self.api.get_json("users/me/").await
    }

    /// PATCH the current user. Prefer [`PulseClient::update_me`](crate::PulseClient::update_me),
    /// which also refreshes the cached session profile.
    pub async fn update_me(&self, patch: &Value) -> Result<User> {
        self.api.patch_json("users/me/", patch).await
    }

    pub async fn list(&self, page: u32) -> Result<Page<User>> {
        self.api
            .get_json_with_query("users/", &vec![("page", page.to_string())])
            .await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.api.get_json(&format!("users/{id}/")).await
    }

    pub async fn update(&self, id: i64, patch: &Value) -> Result<User> {
        self.api.patch_json(&format!("users/{id}/"), patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("users/{id}/")).await
    }
}
