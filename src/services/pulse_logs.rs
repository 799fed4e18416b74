use crate::api_client::ApiClient;
use crate::error::Result;
use crate::models::{NewPulseLog, Page, PulseLog, PulseLogFilter};
use crate::session_manager::TokenRefresher;
use serde_json::Value;

/// `/pulse-logs/`
pub struct PulseLogs<'a, R> {
    api: &'a ApiClient<R>,
}

impl<'a, R: TokenRefresher> PulseLogs<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self { api }
    }

    pub async fn list(&self, filter: &PulseLogFilter) -> Result<Page<PulseLog>> {
        self.api
            .get_json_with_query("pulse-logs/", &filter.to_query())
            .await
    }

    pub async fn create(&self, log: &NewPulseLog) -> Result<PulseLog> {
        self.api.post_json("pulse-logs/", log).await
    }

    pub async fn get(&self, id: i64) -> Result<PulseLog> {
        self.api.get_json(&format!("pulse-logs/{id}/")).await
    }

    pub async fn update(&self, id: i64, patch: &Value) -> Result<PulseLog> {
        self.api.patch_json(&format!("pulse-logs/{id}/"), patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("pulse-logs/{id}/")).await
    }
}
