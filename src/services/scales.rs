use crate::api_client::ApiClient;
use crate::error::Result;
use crate::models::{Mood, NewScaleOption, Page, ScaleOption, Workload};
use crate::session_manager::TokenRefresher;
use serde_json::Value;

/// Moods and workloads share one shape, differing only by collection path.
struct ScaleResource<'a, R> {
    api: &'a ApiClient<R>,
    collection: &'static str,
}

impl<'a, R: TokenRefresher> ScaleResource<'a, R> {
    async fn list(&self) -> Result<Vec<ScaleOption>> {
        let page: Page<ScaleOption> = self.api.get_json(&format!("{}/", self.collection)).await?;
        Ok(page.results)
    }

    async fn get(&self, id: i64) -> Result<ScaleOption> {
        self.api.get_json(&format!("{}/{id}/", self.collection)).await
    }

    async fn create(&self, option: &NewScaleOption) -> Result<ScaleOption> {
        self.api.post_json(&format!("{}/", self.collection), option).await
    }

    async fn update(&self, id: i64, patch: &Value) -> Result<ScaleOption> {
        self.api
            .patch_json(&format!("{}/{id}/", self.collection), patch)
            .await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("{}/{id}/", self.collection)).await
    }
}

/// `/moods/`
pub struct Moods<'a, R>(ScaleResource<'a, R>);

impl<'a, R: TokenRefresher> Moods<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self(ScaleResource { api, collection: "moods" })
    }

    pub async fn list(&self) -> Result<Vec<Mood>> {
        self.0.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Mood> {
        self.0.get(id).await
    }

    pub async fn create(&self, mood: &NewScaleOption) -> Result<Mood> {
        self.0.create(mood).await
    }

    pub async fn update(&self, id: i64, patch: &Value) -> Result<Mood> {
        self.0.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete(id).await
    }
}

/// `/workloads/`
pub struct Workloads<'a, R>(ScaleResource<'a, R>);

impl<'a, R: TokenRefresher> Workloads<'a, R> {
    pub(crate) fn new(api: &'a ApiClient<R>) -> Self {
        Self(ScaleResource { api, collection: "workloads" })
    }

    pub async fn list(&self) -> Result<Vec<Workload>> {
        self.0.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Workload> {
        self.0.get(id).await
    }

    pub async fn create(&self, workload: &NewScaleOption) -> Result<Workload> {
        self.0.create(workload).await
    }

    pub async fn update(&self, id: i64, patch: &Value) -> Result<Workload> {
        self.0.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.0.delete(id).await
    }
}
