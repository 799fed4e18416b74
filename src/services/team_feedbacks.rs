use crate::api_client::ApiClient;
use crate::error::Result;
use crate::models::{NewTeamFeedback, Page, TeamFeedback};
use crate::session_manager::TokenRefresher;

/// `/team-feedbacks/`
pub struct TeamFeedbacks<'a, R> {
    api: &'a ApiClient<R>,
}

impl<'a, R: TokenRefresher> TeamFeedbacks<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self { api }
    }

    /// `is_anonymous = None` lists everything
    pub async fn list(&self, is_anonymous: Option<bool>) -> Result<Vec<TeamFeedback>> {
        let query = is_anonymous
            .map(|flag| vec![("is_anonymous", flag.to_string())])
            .unwrap_or_default();
        let page: Page<TeamFeedback> = self.api.get_json_with_query("team-feedbacks/", &query).await?;
        Ok(page.results)
    }

    pub async fn create(&self, feedback: &NewTeamFeedback) -> Result<TeamFeedback> {
        self.api.post_json("team-feedbacks/", feedback).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("team-feedbacks/{id}/")).await
    }
}
