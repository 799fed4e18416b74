use crate::api_client::{parse_json, ApiClient};
use crate::error::Result;
use crate::models::{MemberChange, NewTeam, Page, Team};
use crate::session_manager::TokenRefresher;
use reqwest::Method;
use serde_json::Value;

/// `/teams/` and `/public/teams/`
pub struct Teams<'a, R> {
    api: &'a ApiClient<R>,
}

impl<'a, R: TokenRefresher> Teams<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: u32) -> Result<Page<Team>> {
        self.api
            .get_json_with_query("teams/", &vec![("page", page.to_string())])
            .await
    }

    /// Teams visible before login, e.g. for the signup form
    pub async fn list_public(&self) -> Result<Vec<Team>> {
        let response = self.api.send_public(Method::GET, "public/teams/", |req| req).await?;
        let page: Page<Team> = parse_json(response).await?;
        Ok(page.results)
    }

    pub async fn get(&self, id: i64) -> Result<Team> {
        self.api.get_json(&format!("teams/{id}/")).await
    }

    pub async fn create(&self, team: &NewTeam) -> Result<Team> {
        self.api.post_json("teams/", team).await
    }

    pub async fn update(&self, id: i64, patch: &Value) -> Result<Team> {
        self.api.patch_json(&format!("teams/{id}/"), patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("teams/{id}/")).await
    }

    pub async fn add_member(&self, team_id: i64, user_id: i64) -> Result<Value> {
        self.api
            .post_json(&format!("teams/{team_id}/add-member/"), &MemberChange { user_id })
            .await
    }

    pub async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<Value> {
        self.api
            .post_json(&format!("teams/{team_id}/remove-member/"), &MemberChange { user_id })
            .await
    }
}
