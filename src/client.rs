//! Entry point tying the session manager, HTTP layer and session store together

use crate::api_client::{build_http_client, ApiClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::services::{Moods, PulseLogs, TeamFeedbacks, Teams, Users, Workloads};
use crate::session::{Session, SessionStore};
use crate::session_manager::{HttpTokenRefresher, SessionManager, TokenRefresher};
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::watch;

/// Pulse API client
///
/// Owns one [`SessionManager`] for its lifetime. Construct once per running
/// application and share by reference or `Arc`.
pub struct PulseClient<R = HttpTokenRefresher> {
    pub(crate) api: ApiClient<R>,
}

impl PulseClient<HttpTokenRefresher> {
    /// Create a client whose refresh call shares the login cookie jar
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        let refresher = HttpTokenRefresher::new(http_client.clone(), &config);
        Ok(Self::with_refresher(config, http_client, refresher, storage))
    }
}

impl<R: TokenRefresher> PulseClient<R> {
    pub fn with_refresher(
        config: ClientConfig,
        http_client: reqwest::Client,
        refresher: R,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let session_manager = Arc::new(SessionManager::new(refresher, &config));
        let session_store = Arc::new(SessionStore::new(storage));
        Self {
            api: ApiClient::new(http_client, &config, session_manager, session_store),
        }
    }

    pub fn api(&self) -> &ApiClient<R> {
        &self.api
    }

    pub fn session_manager(&self) -> &SessionManager<R> {
        self.api.session_manager()
    }

    /// Current UI-facing session
    pub fn session(&self) -> Session {
        self.api.session_store().current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.api.session_store().subscribe()
    }

    pub fn teams(&self) -> Teams<'_, R> {
        Teams::new(&self.api)
    }

    pub fn users(&self) -> Users<'_, R> {
        Users::new(&self.api)
    }

    pub fn moods(&self) -> Moods<'_, R> {
        Moods::new(&self.api)
    }

    pub fn workloads(&self) -> Workloads<'_, R> {
        Workloads::new(&self.api)
    }

    pub fn pulse_logs(&self) -> PulseLogs<'_, R> {
        PulseLogs::new(&self.api)
    }

    pub fn team_feedbacks(&self) -> TeamFeedbacks<'_, R> {
        TeamFeedbacks::new(&self.api)
    }
}
