//! Access token lifecycle with single-flight refresh

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::token_store::TokenStore;
use crate::types::{Credential, TokenResponse};
use async_singleflight::Group;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Performs the network half of a refresh
///
/// The refresh secret is never visible here: the HTTP implementation relies
/// on the cookie jar of its `reqwest::Client` to carry it.
pub trait TokenRefresher: Send + Sync + 'static {
    /// Exchange the out-of-band refresh secret for a new access token
    fn refresh_access(&self) -> impl Future<Output = Result<TokenResponse>> + Send;
}

/// Refresher that POSTs to `/auth/refresh/` with cookies included
#[derive(Clone)]
pub struct HttpTokenRefresher {
    http_client: Client,
    refresh_url: String,
}

impl HttpTokenRefresher {
    /// `http_client` must be the cookie-enabled client that performed login,
    /// so the HTTP-only refresh cookie is sent along.
    pub fn new(http_client: Client, config: &ClientConfig) -> Self {
        Self {
            http_client,
            refresh_url: format!("{}/auth/refresh/", config.api_url()),
        }
    }
}

impl TokenRefresher for HttpTokenRefresher {
    async fn refresh_access(&self) -> Result<TokenResponse> {
        let response = self
            .http_client
            .post(&self.refresh_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response_body(status, &text));
        }

        let body = response.text().await?;
        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("refresh response: {e}")))
    }
}

/// Result shared by every caller that joined one refresh flight.
#[derive(Clone, Debug)]
enum RefreshOutcome {
    Renewed(String),
    /// A login, logout or another refresh replaced the session first.
    Superseded,
    Failed(String),
}

/// Owner of the access credential
///
/// One instance per running client, shared by `Arc` between the HTTP layer
/// and the login/logout flows. It is the only component that starts a
/// refresh network call.
pub struct SessionManager<R> {
    refresher: Arc<R>,
    token_store: Arc<TokenStore>,
    default_ttl: Duration,
    refresh_buffer: Duration,
    /// Singleflight group keyed by token store generation, so a `clear()`
    /// detaches later callers from a flight that started before it.
    /// Error type is String because singleflight requires shared error type
    refresh_singleflight: Group<RefreshOutcome, String>,
}

impl<R: TokenRefresher> SessionManager<R> {
    pub fn new(refresher: R, config: &ClientConfig) -> Self {
        Self::with_timings(refresher, config.token_ttl(), config.refresh_buffer())
    }

    pub fn with_timings(refresher: R, default_ttl: Duration, refresh_buffer: Duration) -> Self {
        Self {
            refresher: Arc::new(refresher),
            token_store: Arc::new(TokenStore::new()),
            default_ttl,
            refresh_buffer,
            refresh_singleflight: Group::new(),
        }
    }

    /// Record a freshly issued access token.
    ///
    /// `expires_in_secs` falls back to the configured lifetime (1800s by
    /// default). Any refresh already in flight will not overwrite it.
    pub fn set_credential(&self, token: impl Into<String>, expires_in_secs: Option<u64>) {
        let ttl = expires_in_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);
        self.token_store.replace(Credential::new(token.into(), ttl));
        debug!(ttl_secs = %ttl.as_secs(), "Access token stored");
    }

    /// Current in-memory token, no network activity
    pub fn get_credential(&self) -> Option<String> {
        self.token_store.token()
    }

    /// Expired (or absent) with respect to the configured refresh buffer
    pub fn is_expired(&self) -> bool {
        self.token_store.is_expired(self.refresh_buffer)
    }

    /// True if no token is set or `now >= expiry - buffer`
    pub fn is_expired_within(&self, buffer: Duration) -> bool {
        self.token_store.is_expired(buffer)
    }

    /// Refresh the access token.
    ///
    /// Concurrent callers share one network call and observe the same
    /// outcome. On failure all credential state is cleared. The network call
    /// runs to completion even if every caller stops waiting.
    pub async fn refresh(&self) -> Result<String> {
        self.refresh_tracked().await.map(|(token, _)| token)
    }

    /// Like [`refresh`](Self::refresh), also returning the token store
    /// generation the returned token belongs to.
    pub(crate) async fn refresh_tracked(&self) -> Result<(String, u64)> {
        let generation = self.token_store.generation();
        let flight_key = generation.to_string();

        let refresher = Arc::clone(&self.refresher);
        let token_store = Arc::clone(&self.token_store);
        let default_ttl = self.default_ttl;

        let (outcome, error, shared) = self
            .refresh_singleflight
            .work(&flight_key, async move {
                let task = tokio::spawn(run_refresh(refresher, token_store, generation, default_ttl));
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => RefreshOutcome::Failed(format!("refresh task aborted: {e}")),
                };
                Ok::<_, String>(outcome)
            })
            .await;

        debug!(generation = %generation, shared = %shared, "Refresh flight settled");

        match (outcome, error) {
            // replace_if_current committed at `generation` and bumped it once
            (Some(RefreshOutcome::Renewed(token)), _) => Ok((token, generation + 1)),
            (Some(RefreshOutcome::Superseded), _) => self.current_unexpired().ok_or_else(|| {
                ClientError::RefreshFailed("session changed while refresh was in flight".to_string())
            }),
            (Some(RefreshOutcome::Failed(reason)), _) | (None, Some(reason)) => {
                Err(ClientError::RefreshFailed(reason))
            }
            (None, None) => Err(ClientError::RefreshFailed(
                "refresh produced no result".to_string(),
            )),
        }
    }

    /// Get a usable access token, refreshing if necessary
    ///
    /// This method handles all token scenarios automatically:
    /// - No token (fresh start, reload, after clear): one refresh attempt
    /// - Token within the refresh buffer of expiry: one refresh attempt
    /// - Valid token: returns immediately
    ///
    /// A failed refresh yields `None`; callers treat it as unauthenticated.
    pub async fn get_valid_token(&self) -> Option<String> {
        self.valid_token_tracked().await.0
    }

    /// Token to attach to a request, paired with the generation it belongs
    /// to so a later 401 only expires the session it was sent with.
    pub(crate) async fn valid_token_tracked(&self) -> (Option<String>, u64) {
        // Fast path: valid token without touching the singleflight group
        if let Some((token, generation)) = self.current_unexpired() {
            return (Some(token), generation);
        }
        if self.token_store.token().is_some() {
            debug!("Access token near expiry, refreshing");
        } else {
            debug!("No access token in memory, attempting refresh");
        }

        match self.refresh_tracked().await {
            Ok((token, generation)) => (Some(token), generation),
            Err(e) => {
                debug!(error = %e, "No valid access token available");
                (None, self.token_store.generation())
            }
        }
    }

    /// Stored token, expired or not, and its generation
    pub(crate) fn token_snapshot(&self) -> (Option<String>, u64) {
        let (current, generation) = self.token_store.snapshot();
        (current.map(|c| c.token().to_string()), generation)
    }

    fn current_unexpired(&self) -> Option<(String, u64)> {
        let (current, generation) = self.token_store.snapshot();
        current
            .filter(|c| !c.is_expired_within(self.refresh_buffer))
            .map(|c| (c.token().to_string(), generation))
    }

    /// Whether a usable token exists or can be obtained
    pub async fn is_authenticated(&self) -> bool {
        self.get_valid_token().await.is_some()
    }

    /// Drop the credential and detach from any in-flight refresh. Idempotent.
    pub fn clear(&self) {
        self.token_store.clear();
        debug!("Access token cleared");
    }

    /// Drop the credential only if nothing replaced it since `generation`.
    /// Returns whether it was dropped.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        let cleared = self.token_store.clear_if_current(generation);
        if cleared {
            debug!(generation = %generation, "Access token cleared");
        }
        cleared
    }

    /// Counter bumped by every credential write, login, refresh or clear
    pub fn generation(&self) -> u64 {
        self.token_store.generation()
    }
}

/// Body of one refresh flight, spawned so it outlives its callers.
async fn run_refresh<R: TokenRefresher>(
    refresher: Arc<R>,
    token_store: Arc<TokenStore>,
    generation: u64,
    default_ttl: Duration,
) -> RefreshOutcome {
    match refresher.refresh_access().await {
        Ok(response) => {
            let ttl = response
                .expires_in
                .map(Duration::from_secs)
                .unwrap_or(default_ttl);
            let credential = Credential::new(response.access.clone(), ttl);

            if token_store.replace_if_current(generation, credential) {
                info!(ttl_secs = %ttl.as_secs(), "Access token refreshed successfully");
                RefreshOutcome::Renewed(response.access)
            } else {
                warn!("Discarding refreshed token, session changed while refresh was in flight");
                RefreshOutcome::Superseded
            }
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed");
            token_store.clear_if_current(generation);
            RefreshOutcome::Failed(e.to_string())
        }
    }
}
